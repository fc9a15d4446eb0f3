use super::{NetState, NetStateRule};

/// Decides whether a layer guarded by `include` and `exclude` rules takes
/// part in a run under `state`.
///
/// The layer is included when `include` is empty or any of its rules
/// matches, and excluded when any `exclude` rule matches. Exclusion wins.
pub fn is_active(include: &[NetStateRule], exclude: &[NetStateRule], state: &NetState) -> bool {
    let included = include.is_empty() || include.iter().any(|rule| rule.matches(state));
    if !included {
        log::debug!("no include rule matches the state");
        return false;
    }

    if let Some(id) = exclude.iter().position(|rule| rule.matches(state)) {
        log::debug!("exclude rule {id} matches the state");
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;

    fn train_only() -> NetStateRule {
        NetStateRule::new().with_phase(Phase::Train)
    }

    #[test]
    fn no_rules_is_always_active() {
        assert!(is_active(&[], &[], &NetState::new(Phase::Train)));
        assert!(is_active(&[], &[], &NetState::new(Phase::Test).with_level(9)));
    }

    #[test]
    fn any_include_rule_is_enough() {
        let include = [train_only(), NetStateRule::new().with_stage("eval")];
        assert!(is_active(&include, &[], &NetState::new(Phase::Train)));
        assert!(is_active(&include, &[], &NetState::new(Phase::Test).with_stage("eval")));
        assert!(!is_active(&include, &[], &NetState::new(Phase::Test)));
    }

    #[test]
    fn exclude_overrides_include() {
        let include = [train_only()];
        let exclude = [NetStateRule::new().with_stage("frozen")];
        let state = NetState::new(Phase::Train).with_stage("frozen");

        assert!(include[0].matches(&state));
        assert!(exclude[0].matches(&state));
        assert!(!is_active(&include, &exclude, &state));
    }

    #[test]
    fn exclude_alone_vetoes() {
        let exclude = [NetStateRule::new().with_levels(Some(3), None)];
        assert!(is_active(&[], &exclude, &NetState::default().with_level(2)));
        assert!(!is_active(&[], &exclude, &NetState::default().with_level(3)));
    }
}
