//! Prometheus alerting-rule document for Windows host resources.
//!
//! [`RuleDocument::from_thresholds`] produces exactly one rule group with
//! three alerts (`HighCPU`, `HighMemory`, `HighDisk`). The PromQL
//! expressions are fixed; only the threshold number is substituted.

use serde::{Deserialize, Serialize};

use crate::thresholds::{PartialThresholds, ThresholdSet};

/// Name of the single rule group written to the rules file.
pub const RULE_GROUP_NAME: &str = "srd_windows_resource_alerts";

const SEVERITY_WARNING: &str = "warning";

/// Top level of a Prometheus rules file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub groups: Vec<RuleGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub name: String,
    pub rules: Vec<AlertRule>,
}

/// One alerting rule. Field order is the order keys appear in the YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub alert: String,
    pub expr: String,
    #[serde(rename = "for")]
    pub for_duration: String,
    pub labels: RuleLabels,
    pub annotations: RuleAnnotations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleLabels {
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAnnotations {
    pub summary: String,
    pub description: String,
}

impl RuleDocument {
    /// Build the rule document, filling any missing threshold with the default.
    ///
    /// Range validation is the caller's job; see [`ThresholdSet::validate`].
    pub fn from_thresholds(thresholds: &PartialThresholds) -> Self {
        let t = thresholds.merge_defaults();
        Self::from_set(&t)
    }

    fn from_set(t: &ThresholdSet) -> Self {
        let rules = vec![
            AlertRule::warning(
                "HighCPU",
                format!(
                    "(100 - (avg by (instance) (irate(windows_cpu_time_total{{mode=\"idle\"}}[5m])) * 100)) > {}",
                    t.cpu
                ),
                "5m",
                "High CPU usage",
                format!("CPU usage >{}% for 5 minutes", t.cpu),
            ),
            AlertRule::warning(
                "HighMemory",
                format!(
                    "((1 - (windows_memory_available_bytes / windows_memory_physical_total_bytes)) * 100) > {}",
                    t.memory
                ),
                "5m",
                "High Memory usage",
                format!("Memory usage >{}% for 5 minutes", t.memory),
            ),
            AlertRule::warning(
                "HighDisk",
                format!(
                    "(100 - (sum by (instance, volume) (windows_logical_disk_free_bytes) / sum by (instance, volume) (windows_logical_disk_size_bytes) * 100)) > {}",
                    t.disk
                ),
                "10m",
                "High Disk usage",
                format!("Disk utilisation >{}% for 10 minutes", t.disk),
            ),
        ];

        Self {
            groups: vec![RuleGroup {
                name: RULE_GROUP_NAME.to_string(),
                rules,
            }],
        }
    }

    /// Serialize to the YAML rules format Prometheus loads on reload.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// All alert rules across groups, in document order.
    pub fn rules(&self) -> impl Iterator<Item = &AlertRule> {
        self.groups.iter().flat_map(|g| g.rules.iter())
    }
}

impl AlertRule {
    fn warning(
        alert: &str,
        expr: String,
        for_duration: &str,
        summary: &str,
        description: String,
    ) -> Self {
        Self {
            alert: alert.to_string(),
            expr,
            for_duration: for_duration.to_string(),
            labels: RuleLabels {
                severity: SEVERITY_WARNING.to_string(),
            },
            annotations: RuleAnnotations {
                summary: summary.to_string(),
                description,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(cpu: i64, memory: i64, disk: i64) -> PartialThresholds {
        ThresholdSet { cpu, memory, disk }.into()
    }

    #[test]
    fn builds_three_rules_in_fixed_order() {
        let doc = RuleDocument::from_thresholds(&set(90, 85, 95));
        assert_eq!(doc.groups.len(), 1);
        assert_eq!(doc.groups[0].name, RULE_GROUP_NAME);

        let names: Vec<&str> = doc.rules().map(|r| r.alert.as_str()).collect();
        assert_eq!(names, ["HighCPU", "HighMemory", "HighDisk"]);
    }

    #[test]
    fn expressions_end_with_supplied_thresholds() {
        let doc = RuleDocument::from_thresholds(&set(90, 85, 95));
        let exprs: Vec<&str> = doc.rules().map(|r| r.expr.as_str()).collect();
        assert!(exprs[0].ends_with("> 90"));
        assert!(exprs[1].ends_with("> 85"));
        assert!(exprs[2].ends_with("> 95"));
    }

    #[test]
    fn every_in_range_value_is_substituted() {
        for v in 10..=100 {
            let doc = RuleDocument::from_thresholds(&set(v, v, v));
            let suffix = format!("> {v}");
            assert_eq!(doc.rules().count(), 3);
            assert!(doc.rules().all(|r| r.expr.ends_with(&suffix)));
        }
    }

    #[test]
    fn partial_input_defaults_to_eighty() {
        let doc = RuleDocument::from_thresholds(&PartialThresholds {
            cpu: Some(70),
            ..Default::default()
        });
        let exprs: Vec<&str> = doc.rules().map(|r| r.expr.as_str()).collect();
        assert!(exprs[0].ends_with("> 70"));
        assert!(exprs[1].ends_with("> 80"));
        assert!(exprs[2].ends_with("> 80"));
    }

    #[test]
    fn cpu_expression_is_verbatim() {
        let doc = RuleDocument::from_thresholds(&PartialThresholds::default());
        let cpu = doc.rules().next().unwrap();
        assert_eq!(
            cpu.expr,
            r#"(100 - (avg by (instance) (irate(windows_cpu_time_total{mode="idle"}[5m])) * 100)) > 80"#
        );
        assert_eq!(cpu.for_duration, "5m");
        assert_eq!(cpu.labels.severity, "warning");
        assert_eq!(cpu.annotations.description, "CPU usage >80% for 5 minutes");
    }

    #[test]
    fn disk_rule_waits_ten_minutes() {
        let doc = RuleDocument::from_thresholds(&PartialThresholds::default());
        let disk = doc.rules().last().unwrap();
        assert_eq!(disk.alert, "HighDisk");
        assert_eq!(disk.for_duration, "10m");
        assert_eq!(disk.annotations.summary, "High Disk usage");
    }

    #[test]
    fn yaml_keeps_key_order_and_parses_back() {
        let doc = RuleDocument::from_thresholds(&set(90, 85, 95));
        let yaml = doc.to_yaml().unwrap();

        let alert_pos = yaml.find("alert:").unwrap();
        let expr_pos = yaml.find("expr:").unwrap();
        let for_pos = yaml.find("for:").unwrap();
        assert!(alert_pos < expr_pos && expr_pos < for_pos);
        assert!(yaml.starts_with("groups:"));

        let parsed: RuleDocument = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, doc);
    }
}
