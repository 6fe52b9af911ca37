//! Lookup backends and the concurrent two-direction batch run.
//!
//! Generation and analysis queries go to different transducers and are
//! independent, so each runs on its own worker thread. Every worker owns
//! its external process and reports back over its own channel; the caller
//! joins both before any result is looked at.

use super::{parse_output, Direction, TransducerResult};
use crate::error::{MorphError, MorphResult};
use crate::spec::ToolCommand;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

/// A backend that answers a batch of queries against one transducer.
pub trait Lookup: Sync {
    /// Submit `queries` to `transducer` and decode the answers.
    fn lookup(&self, transducer: &Path, queries: &[String]) -> MorphResult<TransducerResult>;

    /// Backend name for logs and error messages.
    fn name(&self) -> &str;
}

/// Runs the configured program as `program [args...] <transducer>`, one
/// process per batch, queries on stdin, answers on stdout.
#[derive(Debug, Clone)]
pub struct ProcessLookup {
    command: ToolCommand,
}

impl ProcessLookup {
    /// Create a backend for a resolved command.
    pub fn new(command: ToolCommand) -> Self {
        Self { command }
    }

    fn spawn_error(&self, source: io::Error) -> MorphError {
        MorphError::Spawn {
            program: self.command.line.clone(),
            source,
        }
    }
}

impl Lookup for ProcessLookup {
    fn lookup(&self, transducer: &Path, queries: &[String]) -> MorphResult<TransducerResult> {
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(transducer)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        let mut input = queries.join("\n");
        input.push('\n');

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.spawn_error(io::Error::other("stdin was not captured")))?;

        // Feed stdin from a second thread so a program that answers while
        // still reading can never fill its stdout pipe and stall us.
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input.as_bytes()));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let output = output.map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output
                .status
                .code()
                .map_or_else(|| output.status.to_string(), |c| c.to_string());
            let first_block = stdout.split("\n\n").next().unwrap_or_default();
            let code = format!("(Error code: {})", code);
            let detail: Vec<&str> = [first_block.trim(), stderr.trim(), code.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect();
            return Err(MorphError::Lookup {
                program: self.command.line.clone(),
                detail: detail.join("\n"),
            });
        }

        // A program that exits cleanly without draining stdin is judged by
        // its output alone.
        if let Err(e) = written {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(self.spawn_error(e));
            }
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| MorphError::Lookup {
            program: self.command.line.clone(),
            detail: format!("output is not valid UTF-8: {}", e.utf8_error()),
        })?;
        Ok(parse_output(&stdout))
    }

    fn name(&self) -> &str {
        &self.command.line
    }
}

/// Queries for one direction and the transducer that answers them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Transducer file passed to the program.
    pub transducer: PathBuf,
    /// Query keys, one per input line.
    pub queries: Vec<String>,
}

/// Answers for both directions. A direction that was not requested stays
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupResults {
    /// Generation answers (lexical → surface).
    pub gen: Option<TransducerResult>,
    /// Analysis answers (surface → lexical).
    pub morph: Option<TransducerResult>,
}

impl LookupResults {
    /// Answers for `direction`, if that direction was run.
    pub fn get(&self, direction: Direction) -> Option<&TransducerResult> {
        match direction {
            Direction::Generation => self.gen.as_ref(),
            Direction::Analysis => self.morph.as_ref(),
        }
    }
}

/// Run the generation and analysis batches concurrently and wait for both.
///
/// Fails if either worker fails; partial results are discarded. There is no
/// timeout: a lookup program that never exits blocks this call.
pub fn lookup_both<L>(
    lookup: &L,
    gen: Option<BatchRequest>,
    morph: Option<BatchRequest>,
) -> MorphResult<LookupResults>
where
    L: Lookup + ?Sized,
{
    info!(program = lookup.name(), "starting lookups");

    thread::scope(|scope| -> MorphResult<LookupResults> {
        let gen_rx = gen.map(|req| spawn_worker(scope, lookup, Direction::Generation, req));
        let morph_rx = morph.map(|req| spawn_worker(scope, lookup, Direction::Analysis, req));

        let gen = gen_rx
            .map(|rx| receive(rx, lookup, Direction::Generation))
            .transpose();
        let morph = morph_rx
            .map(|rx| receive(rx, lookup, Direction::Analysis))
            .transpose();

        let results = LookupResults {
            gen: gen?,
            morph: morph?,
        };
        info!("lookups done");
        Ok(results)
    })
}

fn spawn_worker<'scope, L>(
    scope: &'scope thread::Scope<'scope, '_>,
    lookup: &'scope L,
    direction: Direction,
    request: BatchRequest,
) -> Receiver<MorphResult<TransducerResult>>
where
    L: Lookup + ?Sized,
{
    let (tx, rx) = mpsc::sync_channel(1);
    scope.spawn(move || {
        let started = Instant::now();
        debug!(
            %direction,
            transducer = %request.transducer.display(),
            queries = request.queries.len(),
            "worker started"
        );
        let result = lookup.lookup(&request.transducer, &request.queries);
        debug!(
            %direction,
            ok = result.is_ok(),
            results = result.as_ref().map_or(0, |r| r.len()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "worker finished"
        );
        // The receiver only goes away if the caller is unwinding.
        let _ = tx.send(result);
    });
    rx
}

fn receive<L>(
    rx: Receiver<MorphResult<TransducerResult>>,
    lookup: &L,
    direction: Direction,
) -> MorphResult<TransducerResult>
where
    L: Lookup + ?Sized,
{
    rx.recv().unwrap_or_else(|_| {
        Err(MorphError::Lookup {
            program: lookup.name().to_string(),
            detail: format!("{} worker exited without a result", direction),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Mutex;

    /// Answers every query `q` with `q` + suffix, where the suffix is the
    /// transducer file name. Records each call.
    struct EchoLookup {
        calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    }

    impl Lookup for EchoLookup {
        fn lookup(&self, transducer: &Path, queries: &[String]) -> MorphResult<TransducerResult> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((transducer.to_path_buf(), queries.to_vec()));
            }
            let suffix = transducer.display().to_string();
            Ok(queries
                .iter()
                .map(|q| (q.clone(), BTreeSet::from([format!("{}{}", q, suffix)])))
                .collect())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct FailingLookup;

    impl Lookup for FailingLookup {
        fn lookup(&self, transducer: &Path, _queries: &[String]) -> MorphResult<TransducerResult> {
            if transducer == Path::new("bad") {
                Err(MorphError::Lookup {
                    program: "failing".to_string(),
                    detail: "bad file\n(Error code: 1)".to_string(),
                })
            } else {
                Ok(TransducerResult::new())
            }
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn request(file: &str, queries: &[&str]) -> BatchRequest {
        BatchRequest {
            transducer: PathBuf::from(file),
            queries: queries.iter().map(|q| q.to_string()).collect(),
        }
    }

    #[test]
    fn test_both_directions() {
        let lookup = EchoLookup {
            calls: Mutex::new(Vec::new()),
        };
        let results = lookup_both(
            &lookup,
            Some(request(".gen", &["a"])),
            Some(request(".morph", &["b", "c"])),
        )
        .unwrap();

        let gen = results.get(Direction::Generation).unwrap();
        assert!(gen["a"].contains("a.gen"));
        let morph = results.get(Direction::Analysis).unwrap();
        assert!(morph["c"].contains("c.morph"));
        assert_eq!(lookup.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_single_direction() {
        let lookup = EchoLookup {
            calls: Mutex::new(Vec::new()),
        };
        let results = lookup_both(&lookup, None, Some(request(".morph", &["b"]))).unwrap();
        assert!(results.gen.is_none());
        assert!(results.morph.is_some());
        assert_eq!(lookup.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_one_failure_fails_the_batch() {
        let err = lookup_both(
            &FailingLookup,
            Some(request("good", &["a"])),
            Some(request("bad", &["b"])),
        )
        .unwrap_err();
        assert!(err.to_string().contains("bad file"));
        assert!(err.is_lookup());
    }
}
