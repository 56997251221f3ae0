use crate::config::Settings;
use crate::generate::Generator;
use crate::infer::{self, solve, solve_with};
use crate::parse::{parse_line, parse_rule_line, parse_rules, parse_rules_file, scan_atoms, Skip};
use crate::{pipeline, Atom, Error, FactStore, Rule, Term};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io::Write;

fn ga(predicate: &str, args: &[&str]) -> Atom {
    Atom::ground(predicate, args)
}

fn rule(line: &str) -> Rule {
    parse_rule_line(line).expect("valid rule")
}

fn seeded() -> FactStore {
    [ga("lattice_structure", &["L1", "D4"]), ga("degree_of_freedom", &["L1", "137"])]
        .into_iter()
        .collect()
}

fn scenario_rules() -> Vec<Rule> {
    parse_rules(
        "lattice_structure(L,D4), degree_of_freedom(L,137) => inverse_coupling(L,137)\n\
         degree_of_freedom(L,N), inverse_coupling(L,N) => explained_constant(N,L)\n",
    )
}

fn atom_set(store: &FactStore) -> HashSet<Atom> {
    store.iter().cloned().collect()
}

////////////// fact store

#[test]
fn test_add_is_idempotent() {
    let mut store = FactStore::new();
    assert!(store.add(ga("p", &["a"])));
    assert!(!store.add(ga("p", &["a"])));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_query_keeps_insertion_order() {
    let mut store = FactStore::new();
    store.add(ga("p", &["b"]));
    store.add(ga("q", &["x"]));
    store.add(ga("p", &["a"]));
    store.add(ga("p", &["b"]));

    let ps: Vec<String> = store.query(Some("p")).iter().map(|a| a.to_string()).collect();
    assert_eq!(ps, ["p(b)", "p(a)"]);
    assert_eq!(store.query(None).len(), 3);
    assert!(store.query(Some("missing")).is_empty());
    assert!(store.contains(&ga("q", &["x"])));
    assert!(!store.contains(&ga("q", &["y"])));
}

#[test]
fn test_store_distinguishes_arity() {
    let mut store = FactStore::new();
    assert!(store.add(ga("p", &["a"])));
    assert!(store.add(ga("p", &["a", "a"])));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_store_refuses_variables() {
    let mut store = FactStore::new();
    assert!(!store.add(Atom::pattern("p", &["X"])));
    assert!(store.is_empty());
}

////////////// terms

#[test]
fn test_variable_convention() {
    assert!(Term::classify("L").is_variable());
    assert!(Term::classify("NAME_X").is_variable());
    assert!(!Term::classify("NAME_2").is_variable());
    assert!(Term::classify("_X").is_variable());
    assert!(!Term::classify("D4").is_variable());
    assert!(!Term::classify("137").is_variable());
    assert!(!Term::classify("Lx").is_variable());
    assert!(!Term::classify("").is_variable());
}

////////////// parser

#[test]
fn test_parser_is_lenient() {
    let text = "\
        # a comment\n\
        \n\
        p(X) => q(X)\n\
        \x20\x20 # indented comment\n\
        this line has no separator\n\
        p(X) => nothing here\n\
        q(X), r(X, Y) => s(Y)\n";
    let rules = parse_rules(text);
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].label, "p(X) => q(X)");
    assert_eq!(rules[1].premise.len(), 2);
}

#[test]
fn test_parse_line_skips() {
    assert_eq!(parse_line("   ").err(), Some(Skip::Blank));
    assert_eq!(parse_line("# p(X) => q(X)").err(), Some(Skip::Comment));
    assert_eq!(parse_line("p(X), q(X)").err(), Some(Skip::NoSeparator));
    assert_eq!(parse_line("p(X) => ").err(), Some(Skip::NoConclusion));
}

#[test]
fn test_parse_arguments() {
    let r = rule("  lattice_structure (L, \"D4\"),degree_of_freedom( L ,'137' ) => inverse_coupling(L,137)  ");
    assert_eq!(r.label, "lattice_structure (L, \"D4\"),degree_of_freedom( L ,'137' ) => inverse_coupling(L,137)");
    assert_eq!(r.premise[0], Atom::pattern("lattice_structure", &["L", "D4"]));
    assert_eq!(r.premise[1], Atom::pattern("degree_of_freedom", &["L", "137"]));
    assert_eq!(r.premise[0].args[0], Term::Variable("L".into()));
    assert_eq!(r.premise[0].args[1], Term::Constant("D4".into()));
    assert_eq!(r.conclusion, Atom::pattern("inverse_coupling", &["L", "137"]));
}

#[test]
fn test_only_first_conclusion_kept() {
    let r = rule("p(X) => q(X), r(X)");
    assert_eq!(r.conclusion, Atom::pattern("q", &["X"]));
}

#[test]
fn test_split_at_first_separator() {
    let r = rule("p(X) => q(X) => r(X)");
    assert_eq!(r.premise, vec![Atom::pattern("p", &["X"])]);
    assert_eq!(r.conclusion, Atom::pattern("q", &["X"]));
}

#[test]
fn test_scan_skips_noise() {
    let atoms = scan_atoms("if p(a) and also q (b, c) but not r() or s(");
    assert_eq!(atoms, vec![ga("p", &["a"]), ga("q", &["b", "c"])]);
}

#[test]
fn test_parse_rules_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# header").unwrap();
    writeln!(file, "p(X) => q(X)").unwrap();
    let rules = parse_rules_file(file.path()).unwrap();
    assert_eq!(rules.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    assert!(matches!(parse_rules_file(&missing), Err(Error::Io { path, .. }) if path == missing));
}

#[test]
fn test_shipped_rules_parse() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/physics_rules.txt");
    let rules = parse_rules_file(path).unwrap();
    assert_eq!(rules.len(), 4);
}

////////////// matching

#[test]
fn test_binding_consistency() {
    let r = rule("p(X, D4), q(X, N) => r(X, N)");

    let store: FactStore = [ga("p", &["L1", "D4"]), ga("q", &["L1", "137"])].into_iter().collect();
    let bindings = r.bindings(&store);
    assert_eq!(bindings.len(), 1);
    assert_eq!(bindings[0].get("X"), Some(&"L1"));
    assert_eq!(bindings[0].get("N"), Some(&"137"));
    assert_eq!(bindings[0].len(), 2);

    let store: FactStore = [ga("p", &["L1", "D4"]), ga("q", &["L2", "137"])].into_iter().collect();
    assert!(r.bindings(&store).is_empty());
}

#[test]
fn test_repeated_variable_within_atom() {
    let r = rule("e(X, X) => loop(X)");
    let store: FactStore = [ga("e", &["a", "b"]), ga("e", &["c", "c"])].into_iter().collect();
    assert_eq!(r.conclusions(&store), vec![ga("loop", &["c"])]);
}

#[test]
fn test_arity_mismatch_is_no_match() {
    let r = rule("p(X, Y) => q(X)");
    let store: FactStore = [ga("p", &["a"]), ga("p", &["a", "b", "c"])].into_iter().collect();
    assert!(r.bindings(&store).is_empty());
}

#[test]
fn test_literal_passthrough() {
    let r = rule("p(X) => q(X, Z, const)");
    let store: FactStore = [ga("p", &["a"])].into_iter().collect();
    assert_eq!(r.conclusions(&store), vec![ga("q", &["a", "Z", "const"])]);
}

////////////// solving

#[test]
fn test_end_to_end_scenario() {
    let mut store = seeded();
    let rounds = solve(&mut store, &scenario_rules(), infer::DEFAULT_MAX_DEPTH);
    assert!(store.contains(&ga("explained_constant", &["137", "L1"])));
    assert!(store.contains(&ga("inverse_coupling", &["L1", "137"])));
    // the second rule sees the first rule's conclusion in the same round
    assert_eq!(rounds, 2);
}

#[test]
fn test_rule_order_changes_rounds_not_facts() {
    let mut forward = seeded();
    let forward_rounds = solve(&mut forward, &scenario_rules(), 10);

    let mut reversed_rules = scenario_rules();
    reversed_rules.reverse();
    let mut reversed = seeded();
    let reversed_rounds = solve(&mut reversed, &reversed_rules, 10);

    assert_eq!(atom_set(&forward), atom_set(&reversed));
    assert_eq!(forward_rounds, 2);
    assert_eq!(reversed_rounds, 3);
}

#[test]
fn test_saturation_report() {
    let mut store = seeded();
    let report = solve_with(&mut store, &scenario_rules(), &infer::Config::default());
    assert!(report.saturated);
    assert_eq!(report.derived, vec![2, 0]);
    assert_eq!(report.rounds, report.derived.len());
}

fn chain(len: usize) -> FactStore {
    let mut store = FactStore::new();
    store.add(ga("reach", &["n0"]));
    for i in 0..len {
        store.add(Atom::ground("next", &[format!("n{i}"), format!("n{}", i + 1)]));
    }
    store
}

#[test]
fn test_round_cap() {
    let rules = parse_rules("reach(X), next(X, Y) => reach(Y)");
    let mut store = chain(30);
    let report = solve_with(&mut store, &rules, &infer::Config { max_depth: 5 });
    assert_eq!(report.rounds, 5);
    assert!(!report.saturated);
    assert_eq!(store.query(Some("reach")).len(), 6);

    let mut store = chain(30);
    assert_eq!(solve(&mut store, &rules, 0), 0);
    assert_eq!(store.len(), 31);
}

#[test]
fn test_growth_is_monotonic() {
    let rules = parse_rules("reach(X), next(X, Y) => reach(Y)");
    let mut store = chain(4);
    let mut previous = store.clone();
    for _ in 0..6 {
        solve(&mut store, &rules, 1);
        assert!(store.len() >= previous.len());
        assert!(previous.iter().all(|a| store.contains(a)));
        assert_eq!(&store.as_slice()[..previous.len()], previous.as_slice());
        previous = store.clone();
    }
    assert_eq!(store.query(Some("reach")).len(), 5);
}

#[test]
fn test_rule_without_premise_fires() {
    let rules = parse_rules("=> axiom(a)");
    assert_eq!(rules.len(), 1);
    assert!(rules[0].premise.is_empty());
    let mut store = FactStore::new();
    assert_eq!(solve(&mut store, &rules, 10), 2);
    assert!(store.contains(&ga("axiom", &["a"])));
}

#[test]
fn test_unsafe_rule_contributes_nothing() {
    let rules = parse_rules("ghost(X) => seen(X)");
    let mut store = seeded();
    assert_eq!(solve(&mut store, &rules, 10), 1);
    assert_eq!(store.len(), 2);
}

////////////// display

#[test]
fn test_display() {
    let r = rule("p(X, a), q(X) => r(X)");
    assert_eq!(r.to_string(), "p(X, a), q(X) => r(X)");
    let store = seeded();
    assert_eq!(store.to_string(), "[lattice_structure(L1, D4), degree_of_freedom(L1, 137)]");
}

////////////// pipeline

struct Recorder {
    prompts: RefCell<Vec<String>>,
    reply: fn() -> crate::Result<String>,
}

impl Generator for Recorder {
    fn generate(&self, prompt: &str) -> crate::Result<String> {
        self.prompts.borrow_mut().push(prompt.to_owned());
        (self.reply)()
    }
}

fn settings_with_rules(text: &str) -> (tempfile::NamedTempFile, Settings) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    let settings = Settings { rules_path: file.path().to_owned(), ..Settings::default() };
    (file, settings)
}

const SCENARIO: &str = "\
    lattice_structure(L,D4), degree_of_freedom(L,137) => inverse_coupling(L,137)\n\
    degree_of_freedom(L,N), inverse_coupling(L,N) => explained_constant(N,L)\n";

#[test]
fn test_pipeline_explains_seeded_problem() {
    let (_file, settings) = settings_with_rules(SCENARIO);
    let recorder = Recorder { prompts: RefCell::default(), reply: || Ok("reconstruction".into()) };
    let problem = "Explain the Fine Structure Constant";

    let outcome = pipeline::run(problem, &settings, Some(&recorder)).unwrap();
    assert_eq!(outcome.explained, vec![ga("explained_constant", &["137", "L1"])]);
    assert_eq!(outcome.response.as_deref(), Some("reconstruction"));

    let prompts = recorder.prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("explained_constant(137, L1)"));
    assert!(prompts[0].contains(problem));
}

#[test]
fn test_pipeline_without_seed_keyword() {
    let (_file, settings) = settings_with_rules(SCENARIO);
    let outcome = pipeline::run("something else", &settings, None).unwrap();
    assert!(outcome.store.is_empty());
    assert!(outcome.explained.is_empty());
    assert!(outcome.response.is_none());
    assert_eq!(outcome.report.rounds, 1);
}

#[test]
fn test_pipeline_survives_generator_errors() {
    let (_file, settings) = settings_with_rules(SCENARIO);
    let missing = Recorder {
        prompts: RefCell::default(),
        reply: || Err(Error::MissingCredential { vars: vec!["GEMINI_API_KEY"] }),
    };
    let outcome = pipeline::run("Fine Structure Constant", &settings, Some(&missing)).unwrap();
    assert!(outcome.response.is_none());
    assert!(!outcome.explained.is_empty());

    let failing = Recorder {
        prompts: RefCell::default(),
        reply: || Err(Error::Collaborator("quota".into())),
    };
    let outcome = pipeline::run("Fine Structure Constant", &settings, Some(&failing)).unwrap();
    assert!(outcome.response.is_none());
    assert_eq!(failing.prompts.borrow().len(), 1);
}

#[test]
fn test_pipeline_missing_rules_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings { rules_path: dir.path().join("absent.txt"), ..Settings::default() };
    assert!(matches!(pipeline::run("x", &settings, None), Err(Error::Io { .. })));
}
