use ndarray::ArrayD;
use net_config::{is_active, LayerParameter, NetState, NetStateRule, Phase};

type Layer = LayerParameter<ArrayD<f32>>;

fn state(phase: Phase, level: i32, stages: &[&str]) -> NetState {
    stages
        .iter()
        .fold(NetState::new(phase).with_level(level), |s, stage| s.with_stage(*stage))
}

#[test]
fn layer_without_rules_is_always_active() {
    let layer = Layer::new("relu1", "ReLU");
    for phase in [Phase::Train, Phase::Test] {
        for level in [-1, 0, 10] {
            assert!(layer.is_active(&state(phase, level, &[])));
            assert!(layer.is_active(&state(phase, level, &["a", "b"])));
        }
    }
}

#[test]
fn train_only_layer() {
    let mut layer = Layer::new("dropout", "Dropout");
    layer.add_include(NetStateRule::new().with_phase(Phase::Train));

    assert!(layer.is_active(&state(Phase::Train, 0, &[])));
    assert!(!layer.is_active(&state(Phase::Test, 0, &[])));
}

#[test]
fn staged_curriculum() {
    let mut warmup = Layer::new("aux_loss", "SoftmaxWithLoss");
    warmup.add_include(NetStateRule::new().with_levels(None, Some(2)));
    warmup.add_include(NetStateRule::new().with_stage("debug"));

    assert!(warmup.is_active(&state(Phase::Train, 1, &[])));
    assert!(!warmup.is_active(&state(Phase::Train, 3, &[])));
    assert!(warmup.is_active(&state(Phase::Train, 3, &["debug"])));
}

#[test]
fn exclusion_vetoes_inclusion() {
    let mut layer = Layer::new("accuracy", "Accuracy");
    layer.add_include(NetStateRule::new().with_phase(Phase::Test));
    layer.add_exclude(NetStateRule::new().with_stage("deploy"));

    let x = state(Phase::Test, 0, &["deploy"]);
    assert!(layer.include(0).matches(&x));
    assert!(layer.exclude(0).matches(&x));
    assert!(!layer.is_active(&x));
    assert!(layer.is_active(&state(Phase::Test, 0, &[])));
}

#[test]
fn composition_is_a_pure_function() {
    let include = [NetStateRule::new().with_stage("a").with_stage("b").with_not_stage("c")];
    let exclude = [NetStateRule::new().with_levels(Some(5), None)];

    assert!(is_active(&include, &exclude, &state(Phase::Test, 0, &["a", "b"])));
    assert!(is_active(&include, &exclude, &state(Phase::Test, 0, &["a", "b", "d"])));
    assert!(!is_active(&include, &exclude, &state(Phase::Test, 0, &["a"])));
    assert!(!is_active(&include, &exclude, &state(Phase::Test, 0, &["a", "b", "c"])));
    assert!(!is_active(&include, &exclude, &state(Phase::Test, 5, &["a", "b"])));
}

#[test]
fn rules_survive_copy_and_clear_resets_them() {
    let mut layer = Layer::new("fc", "InnerProduct");
    layer.add_exclude(NetStateRule::new().with_phase(Phase::Train));

    let mut copy = Layer::default();
    copy.copy_from(&layer);
    assert!(!copy.is_active(&state(Phase::Train, 0, &[])));

    copy.clear();
    assert!(copy.is_active(&state(Phase::Train, 0, &[])));
    assert_eq!(copy.name(), "fc");
}
