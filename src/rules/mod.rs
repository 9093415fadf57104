//! Rule compiler: turns trigger configuration text into the active list.
//!
//! ```text
//! // comment
//! t1,TITLE,election
//! t2,DESCRIPTION,Trump
//! t3,DESCRIPTION,Clinton
//! t4,AND,t2,t3
//! ADD,t1,t4
//! ```
//!
//! Lines are processed strictly in order. Names must be defined before they
//! are referenced and cannot be redefined, which also rules out cycles. The
//! first error aborts the whole compile, so a broken file never yields a
//! partially built list.

pub mod active;
pub mod error;
pub mod line;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::FixedOffset;

use crate::trigger::time::default_reference_zone;
use crate::trigger::{TimeTrigger, Trigger};

pub use active::ActiveTriggers;
pub use error::RuleError;
use line::{rule_lines, Kind, RuleLine, ADD};

pub type Result<T> = std::result::Result<T, RuleError>;

/// Compile `text` with timestamps read in the default reference zone.
pub fn compile(text: &str) -> Result<Vec<Arc<Trigger>>> {
    Compiler::default().compile(text)
}

/// Read and compile a rules file.
pub fn load(path: &Path, zone: FixedOffset) -> Result<Vec<Arc<Trigger>>> {
    let text = std::fs::read_to_string(path).map_err(|e| RuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let triggers = Compiler::new(zone)
        .compile(&text)
        .map_err(|e| e.with_path(path))?;
    tracing::info!(
        "Compiled {} active triggers from {}",
        triggers.len(),
        path.display()
    );
    Ok(triggers)
}

#[derive(Debug, Clone, Copy)]
pub struct Compiler {
    zone: FixedOffset,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(default_reference_zone())
    }
}

impl Compiler {
    pub fn new(zone: FixedOffset) -> Self {
        Self { zone }
    }

    pub fn compile(&self, text: &str) -> Result<Vec<Arc<Trigger>>> {
        let mut registry = Registry::default();
        let mut active = Vec::new();

        for line in rule_lines(text) {
            let fields = line.fields();

            if fields[0] == ADD {
                let names = &fields[1..];
                if names.is_empty() {
                    return Err(RuleError::EmptyAdd {
                        line: line.number,
                        content: line.content.to_string(),
                    });
                }
                if names.iter().any(|n| n.is_empty()) {
                    return Err(RuleError::EmptyName {
                        line: line.number,
                        content: line.content.to_string(),
                    });
                }
                for name in names {
                    active.push(registry.resolve(&line, name)?);
                }
                continue;
            }

            let trigger = self.build(&registry, &line, &fields)?;
            tracing::debug!("line {}: {} = {}", line.number, fields[0], trigger);
            registry.define(&line, fields[0], trigger)?;
        }

        Ok(active)
    }

    fn build(
        &self,
        registry: &Registry,
        line: &RuleLine<'_>,
        fields: &[&str],
    ) -> Result<Trigger> {
        let name = fields[0];
        if name.is_empty() {
            return Err(RuleError::EmptyName {
                line: line.number,
                content: line.content.to_string(),
            });
        }

        let Some(token) = fields.get(1) else {
            return Err(RuleError::Arity {
                line: line.number,
                content: line.content.to_string(),
                kind: "definition".to_string(),
                expected: 1,
                found: 0,
            });
        };
        let kind = Kind::parse(token).ok_or_else(|| RuleError::UnknownType {
            line: line.number,
            content: line.content.to_string(),
            kind: token.to_string(),
        })?;

        let args = &fields[2..];
        if args.len() != kind.arity() {
            return Err(RuleError::Arity {
                line: line.number,
                content: line.content.to_string(),
                kind: kind.as_str().to_string(),
                expected: kind.arity(),
                found: args.len(),
            });
        }

        let trigger = match kind {
            Kind::Title => Trigger::title(args[0]),
            Kind::Description => Trigger::description(args[0]),
            Kind::After => Trigger::after(self.timestamp(line, args[0])?),
            Kind::Before => Trigger::before(self.timestamp(line, args[0])?),
            Kind::Not => Trigger::not(registry.resolve(line, args[0])?),
            Kind::And => Trigger::and(
                registry.resolve(line, args[0])?,
                registry.resolve(line, args[1])?,
            ),
            Kind::Or => Trigger::or(
                registry.resolve(line, args[0])?,
                registry.resolve(line, args[1])?,
            ),
        };

        Ok(trigger)
    }

    fn timestamp(&self, line: &RuleLine<'_>, value: &str) -> Result<TimeTrigger> {
        TimeTrigger::parse(value, self.zone).map_err(|e| RuleError::InvalidTimestamp {
            line: line.number,
            content: line.content.to_string(),
            value: value.to_string(),
            source: e,
        })
    }
}

/// Name to trigger mapping, alive only while one compile runs.
#[derive(Default)]
struct Registry {
    triggers: HashMap<String, Arc<Trigger>>,
}

impl Registry {
    fn resolve(&self, line: &RuleLine<'_>, name: &str) -> Result<Arc<Trigger>> {
        self.triggers
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::UndefinedReference {
                line: line.number,
                content: line.content.to_string(),
                name: name.to_string(),
            })
    }

    fn define(&mut self, line: &RuleLine<'_>, name: &str, trigger: Trigger) -> Result<()> {
        if self.triggers.contains_key(name) {
            return Err(RuleError::DuplicateName {
                line: line.number,
                content: line.content.to_string(),
                name: name.to_string(),
            });
        }
        self.triggers.insert(name.to_string(), Arc::new(trigger));
        Ok(())
    }
}
