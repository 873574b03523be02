use varelim::pedigree::{family_network, Family, FamilyMember, PedigreeError, FOUNDER_MUTATION_RATE};
use varelim::{compute_conditional, compute_marginal, BayesError, Event, InferenceError};

const MU: f64 = FOUNDER_MUTATION_RATE;

fn affected(name: &str) -> Event {
    Event::new().with(format!("H_{name}"), "+")
}

#[test]
fn son_of_carrier_line_is_one_in_four() {
    // The mother's own mother is a known carrier; neither father is known.
    let family = Family::new(vec![
        FamilyMember::female("grandmother"),
        FamilyMember::female("mother").with_mother("grandmother"),
        FamilyMember::male("son").with_mother("mother"),
    ])
    .unwrap();
    let net = family_network(&family).unwrap();

    let p = compute_conditional(
        &net,
        &affected("son"),
        &Event::new().with("G_grandmother", "xX"),
    )
    .unwrap();

    assert!((p - 0.25).abs() <= MU);
    assert!((p - (0.25 + MU / 2.0)).abs() < 1e-12);
}

#[test]
fn son_of_known_carrier_is_one_in_two() {
    let family = Family::new(vec![
        FamilyMember::female("mother"),
        FamilyMember::male("son").with_mother("mother"),
    ])
    .unwrap();
    let net = family_network(&family).unwrap();

    let p = compute_conditional(&net, &affected("son"), &Event::new().with("G_mother", "xX")).unwrap();
    assert!((p - 0.5).abs() < 1e-12);
}

#[test]
fn romanoff_priors_follow_mutation_rate() {
    let net = family_network(&Family::romanoffs()).unwrap();

    let alexey = compute_marginal(&net, ["H_alexey"]).unwrap();
    assert!((alexey.lookup(&affected("alexey")).unwrap() - MU).abs() < 1e-15);

    let anastasia = compute_marginal(&net, ["H_anastasia"]).unwrap();
    assert!((anastasia.lookup(&affected("anastasia")).unwrap() - MU * MU).abs() < 1e-15);
}

#[test]
fn affected_brother_makes_sister_likely_carrier() {
    let net = family_network(&Family::romanoffs()).unwrap();
    let p = compute_conditional(
        &net,
        &Event::new().with("G_anastasia", "xX"),
        &affected("alexey"),
    )
    .unwrap();
    assert!((p - (0.5 + 0.5 * MU - MU * MU)).abs() < 1e-9);
}

#[test]
fn status_marginal_is_normalized() {
    let net = family_network(&Family::romanoffs()).unwrap();
    let joint = compute_marginal(&net, ["H_alexandra", "H_nicholas", "H_alexey", "H_anastasia"]).unwrap();
    assert_eq!(joint.len(), 16);
    assert!((joint.total() - 1.0).abs() < 1e-12);
}

#[test]
fn contradictory_evidence_has_zero_probability() {
    let net = family_network(&Family::romanoffs()).unwrap();
    let evidence = Event::new().with("G_alexey", "xy").with("H_alexey", "+");
    let err = compute_conditional(&net, &affected("anastasia"), &evidence).unwrap_err();
    assert!(matches!(
        err,
        BayesError::Inference(InferenceError::ZeroProbabilityEvidence { .. })
    ));
}

#[test]
fn lookup_errors_on_pedigree_factors() {
    let net = family_network(&Family::romanoffs()).unwrap();
    let hemophilia = net
        .factors()
        .iter()
        .find(|f| f.scope() == ["G_alexey", "H_alexey"])
        .unwrap();

    let err = hemophilia.lookup(&affected("alexey")).unwrap_err();
    assert_eq!(err, InferenceError::MissingVariable { variable: "G_alexey".to_string() });

    // Males have no "xX" genotype.
    let err = hemophilia
        .lookup(&affected("alexey").with("G_alexey", "xX"))
        .unwrap_err();
    assert!(matches!(err, InferenceError::KeyNotFound { .. }));
}

#[test]
fn invalid_family_is_rejected() {
    let err = Family::new(vec![FamilyMember::male("son").with_father("nobody")]).unwrap_err();
    assert!(matches!(err, PedigreeError::UnknownParent { .. }));

    let wrapped: BayesError = err.into();
    assert!(wrapped.to_string().contains("nobody"));
}
