//! Acceptance test harness.
//!
//! A test is a list of [`Step`]s, each an HCL configuration plus attribute
//! checks. Every step is applied on top of the state left by the previous one:
//! new resources are created, existing ones updated (or replaced), and
//! resources missing from the configuration destroyed. After the last step
//! everything is destroyed.
//!
//! References to other objects are written as quoted interpolations,
//! `"${doublecloud_network.main.id}"` or `"${data.doublecloud_network.main.id}"`,
//! and resolved against the state of objects applied earlier in the step.
//!
//! ```ignore
//! let config = format!(
//!     r#"
//! resource "doublecloud_network" "main" {{
//!   project_id      = {:?}
//!   name            = {:?}
//!   region_id       = "eu-central-1"
//!   cloud_type      = "aws"
//!   ipv4_cidr_block = "10.0.0.0/16"
//! }}
//! "#,
//!     project_id, name
//! );
//! AccTest::new(&tester)
//!     .step(Step::new(config).check(check_resource_attr("doublecloud_network.main", "name", name)))
//!     .run()
//!     .await?;
//! ```

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ProviderTester, TestError};
use crate::error::ProviderError;
use crate::server::ProviderService;
use crate::validation::coerce;

/// Prefix of every object name created by acceptance tests.
pub const TEST_PREFIX: &str = "tf-acc";

/// Whether live acceptance tests are enabled (`TF_ACC` set and not `0`).
pub fn acc_enabled() -> bool {
    std::env::var("TF_ACC").map_or(false, |v| !v.is_empty() && v != "0")
}

/// A unique object name for an acceptance test.
pub fn random_name(kind: &str) -> String {
    format!(
        "{}-{}-{}",
        TEST_PREFIX,
        kind,
        chrono::Utc::now().format("%m%d%H%M%S%3f")
    )
}

/// Failure of an acceptance test.
#[derive(Debug, thiserror::Error)]
pub enum AccError {
    /// The configuration is not valid HCL.
    #[error("invalid configuration: {0}")]
    Parse(#[from] hcl::Error),
    /// The configuration parsed but cannot be applied.
    #[error("step {step}: {message}")]
    Config {
        /// Step index, starting at 1.
        step: usize,
        /// What is wrong.
        message: String,
    },
    /// A provider call failed.
    #[error("step {step}: {address}: {source}")]
    Apply {
        /// Step index, starting at 1.
        step: usize,
        /// Object address.
        address: String,
        /// Underlying failure.
        source: TestError,
    },
    /// An attribute check failed.
    #[error("step {step}: {address}.{path}: expected {expected:?}, got {actual:?}")]
    Check {
        /// Step index, starting at 1.
        step: usize,
        /// Object address.
        address: String,
        /// Attribute path.
        path: String,
        /// Expected value, `None` for "any value".
        expected: Option<String>,
        /// Actual value, `None` when unset.
        actual: Option<String>,
    },
}

/// An attribute assertion run after a step is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    address: String,
    path: String,
    expected: Option<String>,
}

/// Assert that `address` has `path` equal to `value`.
///
/// Paths are dotted; numeric segments index lists, e.g. `connect.0.name`.
pub fn check_resource_attr(
    address: impl Into<String>,
    path: impl Into<String>,
    value: impl Into<String>,
) -> Check {
    Check {
        address: address.into(),
        path: path.into(),
        expected: Some(value.into()),
    }
}

/// Assert that `address` has any non-null value at `path`.
pub fn check_resource_attr_set(address: impl Into<String>, path: impl Into<String>) -> Check {
    Check {
        address: address.into(),
        path: path.into(),
        expected: None,
    }
}

/// One configuration to apply.
#[derive(Debug, Clone)]
pub struct Step {
    config: String,
    checks: Vec<Check>,
}

impl Step {
    /// A step applying `config`.
    pub fn new(config: impl Into<String>) -> Self {
        Self {
            config: config.into(),
            checks: Vec::new(),
        }
    }

    /// Add a check.
    pub fn check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Managed,
    Data,
}

/// A `resource` or `data` block.
#[derive(Debug, Clone, PartialEq)]
struct Item {
    mode: Mode,
    type_name: String,
    address: String,
    body: Value,
}

/// Parse the `resource` and `data` blocks of a configuration, in order.
fn parse_config(text: &str) -> Result<Vec<Item>, AccError> {
    let body = hcl::parse(text)?;
    let mut items = Vec::new();
    for block in body.into_blocks() {
        let mode = match block.identifier.as_str() {
            "resource" => Mode::Managed,
            "data" => Mode::Data,
            _ => continue,
        };
        let labels: Vec<&str> = block.labels.iter().map(|l| l.as_str()).collect();
        let [type_name, name] = labels[..] else {
            return Err(AccError::Config {
                step: 0,
                message: format!(
                    "{} block needs a type and a name label",
                    block.identifier.as_str()
                ),
            });
        };
        let address = match mode {
            Mode::Managed => format!("{}.{}", type_name, name),
            Mode::Data => format!("data.{}.{}", type_name, name),
        };
        let type_name = type_name.to_string();
        let body: Value = hcl::from_body(block.body)?;
        items.push(Item {
            mode,
            type_name,
            address,
            body,
        });
    }
    Ok(items)
}

/// Addresses referenced by `${...}` interpolations in a value.
fn references(value: &Value, found: &mut HashSet<String>) {
    match value {
        Value::String(s) => {
            for expr in interpolations(s) {
                if let Some(address) = reference_address(expr) {
                    found.insert(address);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| references(v, found)),
        Value::Object(map) => map.values().for_each(|v| references(v, found)),
        _ => {}
    }
}

fn interpolations(s: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push(after[..end].trim());
        rest = &after[end + 1..];
    }
    out
}

/// Split `type.name.attr.path` into the object address and the attribute path.
fn split_reference(expr: &str) -> Option<(String, &str)> {
    let segments: Vec<&str> = expr.splitn(4, '.').collect();
    match segments[..] {
        ["data", type_name, name, path] => Some((format!("data.{}.{}", type_name, name), path)),
        ["data", ..] => None,
        [type_name, name, _] | [type_name, name, _, _] => Some((
            format!("{}.{}", type_name, name),
            &expr[type_name.len() + name.len() + 2..],
        )),
        _ => None,
    }
}

fn reference_address(expr: &str) -> Option<String> {
    split_reference(expr).map(|(address, _)| address)
}

/// Value at a dotted path; numeric segments index lists.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Value::Object(map) => map.get(segment),
        _ => None,
    })
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Replace interpolations with values from `states`.
fn resolve(value: Value, states: &BTreeMap<String, Value>) -> Result<Value, String> {
    match value {
        Value::String(s) => resolve_string(s, states),
        Value::Array(items) => items
            .into_iter()
            .map(|v| resolve(v, states))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| resolve(v, states).map(|v| (k, v)))
            .collect::<Result<serde_json::Map<_, _>, _>>()
            .map(Value::Object),
        other => Ok(other),
    }
}

fn resolve_string(s: String, states: &BTreeMap<String, Value>) -> Result<Value, String> {
    let exprs = interpolations(&s);
    if exprs.is_empty() {
        return Ok(Value::String(s));
    }

    let lookup_expr = |expr: &str| -> Result<Value, String> {
        let (address, path) =
            split_reference(expr).ok_or_else(|| format!("unsupported reference ${{{}}}", expr))?;
        let state = states
            .get(&address)
            .ok_or_else(|| format!("{} is not applied yet", address))?;
        lookup(state, path)
            .cloned()
            .ok_or_else(|| format!("{} has no attribute {}", address, path))
    };

    let trimmed = s.trim();
    if exprs.len() == 1 && trimmed.starts_with("${") && trimmed.ends_with('}') {
        return lookup_expr(exprs[0]);
    }

    let mut out = s.clone();
    for expr in exprs {
        let value = lookup_expr(expr)?;
        let text = render(&value).unwrap_or_default();
        out = out.replacen(&format!("${{{}}}", expr), &text, 1);
    }
    Ok(Value::String(out))
}

/// Order items so every object comes after the objects it references.
fn apply_order(items: Vec<Item>, step: usize) -> Result<Vec<Item>, AccError> {
    let declared: HashSet<String> = items.iter().map(|i| i.address.clone()).collect();
    let mut pending = items;
    let mut ordered: Vec<Item> = Vec::new();
    let mut applied: HashSet<String> = HashSet::new();

    while !pending.is_empty() {
        let (ready, blocked): (Vec<Item>, Vec<Item>) = pending.into_iter().partition(|item| {
            let mut deps = HashSet::new();
            references(&item.body, &mut deps);
            deps.iter()
                .all(|d| applied.contains(d) || !declared.contains(d))
        });
        if ready.is_empty() {
            let addresses: Vec<&str> = blocked.iter().map(|i| i.address.as_str()).collect();
            return Err(AccError::Config {
                step,
                message: format!("reference cycle between {}", addresses.join(", ")),
            });
        }
        applied.extend(ready.iter().map(|i| i.address.clone()));
        ordered.extend(ready);
        pending = blocked;
    }
    Ok(ordered)
}

/// Runs [`Step`]s against a configured [`ProviderTester`].
pub struct AccTest<'a, P: ProviderService> {
    tester: &'a ProviderTester<P>,
    steps: Vec<Step>,
}

#[derive(Debug, Clone)]
struct Applied {
    type_name: String,
    state: Value,
}

impl<'a, P: ProviderService> AccTest<'a, P> {
    /// A test driving `tester`, which must already be configured.
    pub fn new(tester: &'a ProviderTester<P>) -> Self {
        Self {
            tester,
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Apply every step, then destroy what is left.
    ///
    /// Destroy runs even when a step fails; the step error is returned first.
    pub async fn run(self) -> Result<(), AccError> {
        let mut managed: Vec<(String, Applied)> = Vec::new();
        let result = self.run_steps(&mut managed).await;
        let destroyed = self.destroy(&mut managed).await;
        result.and(destroyed)
    }

    async fn run_steps(&self, managed: &mut Vec<(String, Applied)>) -> Result<(), AccError> {
        for (index, step) in self.steps.iter().enumerate() {
            let number = index + 1;
            info!(step = number, "Applying acceptance step");
            let items = parse_config(&step.config).map_err(|e| match e {
                AccError::Config { message, .. } => AccError::Config {
                    step: number,
                    message,
                },
                other => other,
            })?;
            let items = apply_order(items, number)?;
            let states = self.apply(number, items, managed).await?;
            run_checks(number, &step.checks, &states)?;
        }
        Ok(())
    }

    async fn apply(
        &self,
        step: usize,
        items: Vec<Item>,
        managed: &mut Vec<(String, Applied)>,
    ) -> Result<BTreeMap<String, Value>, AccError> {
        let mut states: BTreeMap<String, Value> = BTreeMap::new();
        for (address, applied) in managed.iter() {
            states.insert(address.clone(), applied.state.clone());
        }
        let wanted: HashSet<String> = items
            .iter()
            .filter(|i| i.mode == Mode::Managed)
            .map(|i| i.address.clone())
            .collect();

        for item in items {
            let fail = |source: TestError| AccError::Apply {
                step,
                address: item.address.clone(),
                source,
            };
            let config_error = |message: String| AccError::Config {
                step,
                message: format!("{}: {}", item.address, message),
            };

            let body = resolve(item.body.clone(), &states).map_err(config_error)?;
            let state = match item.mode {
                Mode::Data => {
                    let schema = self
                        .tester
                        .data_source_schema(&item.type_name)
                        .map_err(|e| fail(e.into()))?;
                    self.tester
                        .read_data_source(&item.type_name, coerce(&schema, body))
                        .await
                        .map_err(|e| fail(e.into()))?
                }
                Mode::Managed => {
                    let schema = self
                        .tester
                        .resource_schema(&item.type_name)
                        .map_err(|e| fail(e.into()))?;
                    let config = coerce(&schema, body);
                    let prior = managed
                        .iter()
                        .position(|(address, _)| *address == item.address);
                    let state = match prior {
                        Some(i) => {
                            debug!(address = %item.address, "Updating");
                            let prior_state = managed[i].1.state.clone();
                            self.tester
                                .lifecycle_update(&item.type_name, prior_state, config)
                                .await
                                .map_err(fail)?
                        }
                        None => {
                            debug!(address = %item.address, "Creating");
                            self.tester
                                .lifecycle_create(&item.type_name, config)
                                .await
                                .map_err(fail)?
                        }
                    };
                    if state.is_null() {
                        return Err(fail(
                            ProviderError::NotFound(format!("{} vanished after apply", item.address))
                                .into(),
                        ));
                    }
                    let applied = Applied {
                        type_name: item.type_name.clone(),
                        state: state.clone(),
                    };
                    match prior {
                        Some(i) => managed[i].1 = applied,
                        None => managed.push((item.address.clone(), applied)),
                    }
                    state
                }
            };
            states.insert(item.address, state);
        }

        // objects dropped from the configuration, newest first
        let mut index = managed.len();
        while index > 0 {
            index -= 1;
            if wanted.contains(&managed[index].0) {
                continue;
            }
            let (address, applied) = managed.remove(index);
            debug!(address = %address, "Destroying");
            self.tester
                .lifecycle_delete(&applied.type_name, applied.state)
                .await
                .map_err(|e| AccError::Apply {
                    step,
                    address: address.clone(),
                    source: e.into(),
                })?;
            states.remove(&address);
        }

        Ok(states)
    }

    async fn destroy(&self, managed: &mut Vec<(String, Applied)>) -> Result<(), AccError> {
        let mut first_error = None;
        while let Some((address, applied)) = managed.pop() {
            debug!(address = %address, "Destroying");
            if let Err(e) = self
                .tester
                .lifecycle_delete(&applied.type_name, applied.state)
                .await
            {
                warn!(address = %address, error = %e, "Destroy failed");
                first_error.get_or_insert(AccError::Apply {
                    step: self.steps.len(),
                    address,
                    source: e.into(),
                });
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn run_checks(step: usize, checks: &[Check], states: &BTreeMap<String, Value>) -> Result<(), AccError> {
    for check in checks {
        let actual = states
            .get(&check.address)
            .and_then(|state| lookup(state, &check.path))
            .and_then(render);
        let ok = match (&check.expected, &actual) {
            (Some(expected), Some(actual)) => expected == actual,
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if !ok {
            return Err(AccError::Check {
                step,
                address: check.address.clone(),
                path: check.path.clone(),
                expected: check.expected.clone(),
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CONFIG: &str = r#"
resource "doublecloud_clickhouse_cluster" "main" {
  project_id = "prj"
  name       = "tf-acc-ch"
  network_id = "${doublecloud_network.main.id}"

  resources {
    clickhouse {
      resource_preset_id = "s1-c2-m4"
      disk_size          = 34359738368
    }
  }
}

resource "doublecloud_network" "main" {
  project_id = "prj"
  name       = "tf-acc-net"
}

data "doublecloud_network" "lookup" {
  id = "${doublecloud_network.main.id}"
}

provider "doublecloud" {}
"#;

    #[test]
    fn test_parse_config_keeps_declaration_order() {
        let items = parse_config(CONFIG).unwrap();
        let addresses: Vec<&str> = items.iter().map(|i| i.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec![
                "doublecloud_clickhouse_cluster.main",
                "doublecloud_network.main",
                "data.doublecloud_network.lookup",
            ]
        );
        assert_eq!(items[2].mode, Mode::Data);
        assert_eq!(items[0].body["name"], "tf-acc-ch");
    }

    #[test]
    fn test_apply_order_follows_references() {
        let items = apply_order(parse_config(CONFIG).unwrap(), 1).unwrap();
        let addresses: Vec<&str> = items.iter().map(|i| i.address.as_str()).collect();
        assert_eq!(addresses[0], "doublecloud_network.main");
        assert!(addresses.contains(&"doublecloud_clickhouse_cluster.main"));
    }

    #[test]
    fn test_apply_order_reports_cycles() {
        let config = r#"
resource "doublecloud_transfer" "a" { source = "${doublecloud_transfer.b.id}" }
resource "doublecloud_transfer" "b" { source = "${doublecloud_transfer.a.id}" }
"#;
        let err = apply_order(parse_config(config).unwrap(), 2).unwrap_err();
        assert!(matches!(err, AccError::Config { step: 2, .. }));
    }

    #[test]
    fn test_resolve_references() {
        let mut states = BTreeMap::new();
        states.insert(
            "doublecloud_clickhouse_cluster.main".to_string(),
            json!({"id": "chc1", "resources": {"clickhouse": {"disk_size": 34359738368_i64}}}),
        );

        let whole = resolve(
            json!({"size": "${doublecloud_clickhouse_cluster.main.resources.clickhouse.disk_size}"}),
            &states,
        )
        .unwrap();
        assert_eq!(whole["size"], 34359738368_i64);

        let embedded = resolve(
            json!("cluster ${doublecloud_clickhouse_cluster.main.id} ready"),
            &states,
        )
        .unwrap();
        assert_eq!(embedded, "cluster chc1 ready");

        assert!(resolve(json!("${doublecloud_network.main.id}"), &states).is_err());
    }

    #[test]
    fn test_run_checks() {
        let mut states = BTreeMap::new();
        states.insert(
            "doublecloud_workbook.main".to_string(),
            json!({"title": "tf-acc", "connect": [{"name": "ch"}], "config": null}),
        );

        let passing = [
            check_resource_attr("doublecloud_workbook.main", "title", "tf-acc"),
            check_resource_attr("doublecloud_workbook.main", "connect.0.name", "ch"),
            check_resource_attr_set("doublecloud_workbook.main", "title"),
        ];
        assert!(run_checks(1, &passing, &states).is_ok());

        let err = run_checks(
            3,
            &[check_resource_attr_set("doublecloud_workbook.main", "config")],
            &states,
        )
        .unwrap_err();
        assert!(matches!(err, AccError::Check { step: 3, actual: None, .. }));
    }

    #[test]
    fn test_random_name_has_prefix() {
        assert!(random_name("network").starts_with("tf-acc-network-"));
    }
}
