//! `fu53 policy`: how the current environment classifies each group.

use anyhow::{Context, Result};
use fu53_policy::policy::classify;
use fu53_policy::{Config, Policy, PolicyGroup};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GroupReport {
    pub group: PolicyGroup,
    pub key: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal_key: Option<&'static str>,
    pub policy: Policy,
}

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub config: &'a Config,
    pub coverage: bool,
    pub groups: Vec<GroupReport>,
}

pub fn build(config: &Config) -> Report<'_> {
    let groups = PolicyGroup::ALL
        .into_iter()
        .map(|group| GroupReport {
            group,
            key: group.key().env_name(),
            fatal_key: group.fatal_key().map(|k| k.env_name()),
            policy: classify(group, config),
        })
        .collect();
    Report {
        config,
        coverage: config.coverage_enabled(),
        groups,
    }
}

pub fn render_table(report: &Report<'_>) -> String {
    let mut out = format!("{:<10} {:<15} {}\n", "GROUP", "KEY", "POLICY");
    for entry in &report.groups {
        let note = match (entry.group, entry.policy) {
            (PolicyGroup::Open, Policy::Deny | Policy::AllowBudgeted(_)) => {
                " (denied writes go to /dev/null)"
            }
            _ => "",
        };
        out.push_str(&format!(
            "{:<10} {:<15} {}{}\n",
            entry.group.name(),
            entry.key,
            entry.policy,
            note
        ));
    }
    if report.coverage {
        out.push_str("coverage artifacts pass through\n");
    }
    out
}

pub fn print(json: bool) -> Result<()> {
    let config = Config::from_env();
    let report = build(&config);
    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{text}");
    } else {
        print!("{}", render_table(&report));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fu53_policy::ConfigKey;

    fn policy_of(report: &Report<'_>, group: PolicyGroup) -> Policy {
        report
            .groups
            .iter()
            .find(|g| g.group == group)
            .map(|g| g.policy)
            .unwrap()
    }

    #[test]
    fn test_report_covers_every_group() {
        let config = Config::default();
        let report = build(&config);
        assert_eq!(report.groups.len(), PolicyGroup::COUNT);
        assert!(report.groups.iter().all(|g| g.policy == Policy::Deny));
    }

    #[test]
    fn test_report_reflects_config() {
        let config = Config::from_pairs(&[
            (ConfigKey::WithOpen, "3"),
            (ConfigKey::WithDup, "1"),
            (ConfigKey::DenyExecFatal, "1"),
        ]);
        let report = build(&config);
        assert_eq!(policy_of(&report, PolicyGroup::Open), Policy::AllowBudgeted(3));
        assert_eq!(policy_of(&report, PolicyGroup::Dup), Policy::AllowUnlimited);
        assert_eq!(policy_of(&report, PolicyGroup::Exec), Policy::Abort);
        assert_eq!(policy_of(&report, PolicyGroup::Fork), Policy::Deny);
    }

    #[test]
    fn test_table_rendering() {
        let config = Config::from_pairs(&[(ConfigKey::WithCoverage, "1")]);
        let table = render_table(&build(&config));
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].starts_with("GROUP"));
        assert!(lines[1].starts_with("open"));
        assert!(lines[1].contains("WITH_OPEN"));
        assert!(lines[1].contains("/dev/null"));
        assert!(table.ends_with("coverage artifacts pass through\n"));
    }

    #[test]
    fn test_json_shape() {
        let config = Config::from_pairs(&[(ConfigKey::WithFork, "2")]);
        let json = serde_json::to_value(build(&config)).unwrap();
        assert_eq!(json["config"]["WITH_FORK"], "2");
        assert_eq!(json["groups"][0]["group"], "open");
        assert_eq!(json["groups"][0]["fatal_key"], "DENY_OPEN_FATAL");
        let fork = json["groups"]
            .as_array()
            .unwrap()
            .iter()
            .find(|g| g["group"] == "fork")
            .unwrap();
        assert_eq!(fork["policy"]["kind"], "allow_budgeted");
        assert_eq!(fork["policy"]["limit"], 2);
        assert!(fork.get("fatal_key").is_none());
    }
}
