//! In-memory node used by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use controlplane::{CommandSpec, ExecResult, Node, NodeError, NodeRef, NodeRole, ARTIFACT_FILES};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One command as seen by a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub node: String,
    pub argv: Vec<String>,
    pub stdin: Option<Vec<u8>>,
}

impl Invocation {
    pub fn program(&self) -> &str {
        &self.argv[0]
    }
}

/// Journal shared by every node of a test cluster, in call order
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<Invocation>>>);

impl Journal {
    pub fn all(&self) -> Vec<Invocation> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, program: &str) -> usize {
        self.all().iter().filter(|i| i.program() == program).count()
    }

    pub fn on_node(&self, node: &str, program: &str) -> Vec<Invocation> {
        self.all()
            .into_iter()
            .filter(|i| i.node == node && i.program() == program)
            .collect()
    }

    /// Completed writes (`cp /dev/stdin <path>`) as (destination, path)
    pub fn copies(&self) -> Vec<(String, String)> {
        self.all()
            .into_iter()
            .filter(|i| i.program() == "cp")
            .map(|i| (i.node.clone(), i.argv[2].clone()))
            .collect()
    }

    fn push(&self, invocation: Invocation) {
        self.0.lock().unwrap().push(invocation);
    }
}

struct FailRule {
    program: String,
    arg: Option<String>,
}

pub struct FakeNode {
    name: String,
    role: NodeRole,
    journal: Journal,
    files: Mutex<HashMap<String, Vec<u8>>>,
    failures: Mutex<Vec<FailRule>>,
    hangs: Mutex<Vec<String>>,
    unreachable: bool,
    broken_pipe: bool,
}

impl FakeNode {
    pub fn new(name: &str, role: NodeRole, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            role,
            journal: journal.clone(),
            files: Mutex::new(HashMap::new()),
            failures: Mutex::new(Vec::new()),
            hangs: Mutex::new(Vec::new()),
            unreachable: false,
            broken_pipe: false,
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Transport breaks mid-exec
    pub fn broken_pipe(mut self) -> Self {
        self.broken_pipe = true;
        self
    }

    /// Exit non-zero for `program`, optionally only when one argument equals `arg`
    pub fn fail_on(self, program: &str, arg: Option<&str>) -> Self {
        self.failures.lock().unwrap().push(FailRule {
            program: program.to_string(),
            arg: arg.map(str::to_string),
        });
        self
    }

    /// Never return from `program`
    pub fn hang_on(self, program: &str) -> Self {
        self.hangs.lock().unwrap().push(program.to_string());
        self
    }

    pub fn with_file(self, path: &str, contents: &[u8]) -> Self {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
        self
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    fn should_fail(&self, argv: &[String]) -> bool {
        self.failures.lock().unwrap().iter().any(|rule| {
            argv[0] == rule.program
                && rule
                    .arg
                    .as_ref()
                    .map_or(true, |arg| argv[1..].iter().any(|a| a == arg))
        })
    }

    fn ok(stdout: impl Into<Vec<u8>>) -> ExecResult {
        ExecResult {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: Vec::new(),
        }
    }

    fn exit(code: i32, stderr: &str) -> ExecResult {
        ExecResult {
            exit_code: code,
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }
}

#[async_trait]
impl Node for FakeNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> NodeRole {
        self.role
    }

    async fn exec(
        &self,
        command: &CommandSpec,
        stdin: Option<&[u8]>,
    ) -> Result<ExecResult, NodeError> {
        let argv = command.argv();
        self.journal.push(Invocation {
            node: self.name.clone(),
            argv: argv.clone(),
            stdin: stdin.map(<[u8]>::to_vec),
        });

        if self.unreachable {
            return Err(NodeError::Unreachable(self.name.clone()));
        }
        if self.broken_pipe {
            let e = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "exec stream closed");
            return Err(e.into());
        }
        let hangs = self.hangs.lock().unwrap().contains(&argv[0]);
        if hangs {
            std::future::pending::<()>().await;
        }
        if self.should_fail(&argv) {
            return Ok(Self::exit(1, &format!("{}: injected failure", argv[0])));
        }

        let result = match argv[0].as_str() {
            "kubeadm" => {
                let mut files = self.files.lock().unwrap();
                for path in ARTIFACT_FILES {
                    files.insert(path.to_string(), format!("{}:{}", self.name, path).into_bytes());
                }
                Self::ok("[init] Using Kubernetes version: v1.30.0\nYour Kubernetes control-plane has initialized successfully!\n")
            }
            "cat" => match self.file(&argv[1]) {
                Some(contents) => Self::ok(contents),
                None => Self::exit(1, &format!("cat: {}: No such file or directory", argv[1])),
            },
            "mkdir" => Self::ok(Vec::new()),
            "cp" => {
                self.files
                    .lock()
                    .unwrap()
                    .insert(argv[2].clone(), stdin.unwrap_or_default().to_vec());
                Self::ok(Vec::new())
            }
            "kubectl" => Self::ok(format!("node/{} untainted\n", self.name)),
            other => Self::exit(127, &format!("{}: command not found", other)),
        };
        Ok(result)
    }
}

/// Recording status reporter
#[derive(Default)]
pub struct RecordingStatus {
    pub events: Mutex<Vec<String>>,
}

impl RecordingStatus {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl controlplane::StatusReporter for RecordingStatus {
    fn start(&self, message: &str) {
        self.events.lock().unwrap().push(format!("start:{}", message));
    }

    fn end(&self, success: bool) {
        self.events.lock().unwrap().push(format!("end:{}", success));
    }
}
