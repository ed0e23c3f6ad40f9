use serde_json::Value;
use tracing::{debug, warn};

use crate::exemptions::glob::Glob;
use crate::exemptions::rules::{ExemptionRule, ExemptionRuleSet};

/// Line that closes the current block.
pub const BLOCK_TERMINATOR: &str = "!";

/// Envelope key holding the configuration lines.
pub const CONFIG_KEY: &str = "config";

enum ScanState<'r> {
    /// Inside a fully exempt block, dropping everything up to and including `!`.
    Exempt,
    /// Inside an ordinary block, dropping lines matching these patterns.
    Block(&'r [Glob]),
}

/// Removes exempt blocks and lines from configuration text.
///
/// A block that is still open at end of input is dropped to the end.
pub fn apply<S: AsRef<str>>(lines: &[S], rules: &ExemptionRuleSet) -> Vec<String> {
    let mut kept = Vec::with_capacity(lines.len());
    let mut state = ScanState::Block(&[]);

    for line in lines.iter().map(AsRef::as_ref) {
        state = match state {
            ScanState::Exempt if line.trim() == BLOCK_TERMINATOR => ScanState::Block(&[]),
            ScanState::Exempt => ScanState::Exempt,
            ScanState::Block(_) if is_header(line) => match rules.first_match(line) {
                Some(ExemptionRule::EntireBlock) => ScanState::Exempt,
                Some(ExemptionRule::Lines(patterns)) => {
                    kept.push(line.to_owned());
                    ScanState::Block(patterns)
                }
                None => {
                    kept.push(line.to_owned());
                    ScanState::Block(&[])
                }
            },
            ScanState::Block(patterns) => {
                let trimmed = line.trim();
                if !patterns.iter().any(|p| p.is_match(trimmed)) {
                    kept.push(line.to_owned());
                }
                ScanState::Block(patterns)
            }
        };
    }

    kept
}

/// Filters the `config` array of an envelope in place.
/// Returns false when the envelope has no array of strings to filter.
pub fn apply_to_envelope(envelope: &mut Value, rules: &ExemptionRuleSet) -> bool {
    let Some(Value::Array(items)) = envelope.get_mut(CONFIG_KEY) else {
        debug!("envelope has no '{}' array, exemptions skipped", CONFIG_KEY);
        return false;
    };

    let Some(lines) = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>() else {
        warn!("'{}' contains non-string entries, exemptions skipped", CONFIG_KEY);
        return false;
    };

    let before = lines.len();
    let filtered = apply(&lines[..], rules);
    debug!("exemptions removed {} of {} lines", before - filtered.len(), before);
    *items = filtered.into_iter().map(Value::String).collect();
    true
}

fn is_header(line: &str) -> bool {
    !line.starts_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(raw: &str) -> ExemptionRuleSet {
        ExemptionRuleSet::from_json_str(raw).unwrap()
    }

    #[test]
    fn entire_block_is_dropped_with_terminator() {
        let out = apply(
            &["interface Gi1", " description x", "!", "hostname sw1"],
            &rules(r#"{"interface *": "*"}"#),
        );
        assert_eq!(out, vec!["hostname sw1"]);
    }

    #[test]
    fn line_rules_only_apply_inside_their_block() {
        let out = apply(
            &["snmp-server host", " community public", " location lab", "!"],
            &rules(r#"{"snmp-server *": ["community *"]}"#),
        );
        assert_eq!(out, vec!["snmp-server host", " location lab", "!"]);

        let out = apply(
            &["snmp-server host", " community public", "!", "router ospf", " community public"],
            &rules(r#"{"snmp-server *": ["community *"]}"#),
        );
        assert_eq!(out, vec!["snmp-server host", "!", "router ospf", " community public"]);
    }

    #[test]
    fn first_matching_header_wins() {
        let out = apply(
            &["interface Gi1", " description uplink", " mtu 9000", "!"],
            &rules(r#"{"interface Gi1": ["description *"], "interface *": "*"}"#),
        );
        assert_eq!(out, vec!["interface Gi1", " mtu 9000", "!"]);
    }

    #[test]
    fn unterminated_exempt_block_swallows_rest() {
        let out = apply(
            &["hostname sw1", "interface Gi1", " description x", "ntp server 1.1.1.1"],
            &rules(r#"{"interface *": "*"}"#),
        );
        assert_eq!(out, vec!["hostname sw1"]);
    }

    #[test]
    fn terminator_is_not_read_as_header() {
        // "!" would open another exempt block if it were re-examined as a header
        let out = apply(
            &["vlan 5", " name x", "!", "hostname sw1"],
            &rules(r#"{"vlan *": "*", "!": "*"}"#),
        );
        assert_eq!(out, vec!["hostname sw1"]);
    }

    #[test]
    fn no_rules_is_identity() {
        let doc = ["hostname sw1", "interface Gi1", " mtu 1500", "!"];
        assert_eq!(apply(&doc, &ExemptionRuleSet::new()), doc.to_vec());
    }

    #[test]
    fn matching_is_literal_case() {
        let out = apply(&["Interface Gi1", " mtu 1500", "!"], &rules(r#"{"interface *": "*"}"#));
        assert_eq!(out, vec!["Interface Gi1", " mtu 1500", "!"]);
    }

    #[test]
    fn reapplying_changes_nothing() {
        let r = rules(r#"{"interface Gi1": ["description *"], "vlan *": "*", "snmp-server *": ["community *"]}"#);
        let doc = [
            "hostname sw1",
            "interface Gi1",
            " description uplink",
            " mtu 9000",
            "!",
            "vlan 10",
            " name users",
            "!",
            "snmp-server host",
            " community public",
            " location lab",
            "!",
            "vlan 20",
            " name open",
        ];
        let once = apply(&doc, &r);
        assert_eq!(apply(&once[..], &r), once);
    }

    #[test]
    fn indented_line_after_exempt_terminator_joins_earlier_block_on_reapply() {
        // the orphan survives the first pass, then lands in the snmp-server block
        let r = rules(r#"{"snmp-server *": ["community *"], "vlan *": "*"}"#);
        let doc = ["snmp-server host", "vlan 10", " name x", "!", " community public"];

        let once = apply(&doc, &r);
        assert_eq!(once, vec!["snmp-server host", " community public"]);
        assert_eq!(apply(&once[..], &r), vec!["snmp-server host"]);
    }

    #[test]
    fn envelope_config_is_filtered_in_place() {
        let mut envelope = json!({"config": ["interface Gi1", " shutdown", "!", "hostname sw1"], "count": 4});
        assert!(apply_to_envelope(&mut envelope, &rules(r#"{"interface *": "*"}"#)));
        assert_eq!(envelope, json!({"config": ["hostname sw1"], "count": 4}));
    }

    #[test]
    fn envelope_without_config_is_untouched() {
        let mut envelope = json!({"other": ["interface Gi1"]});
        assert!(!apply_to_envelope(&mut envelope, &rules(r#"{"interface *": "*"}"#)));
        assert_eq!(envelope, json!({"other": ["interface Gi1"]}));

        let mut mixed = json!({"config": ["interface Gi1", 5]});
        assert!(!apply_to_envelope(&mut mixed, &rules(r#"{"interface *": "*"}"#)));
    }
}
