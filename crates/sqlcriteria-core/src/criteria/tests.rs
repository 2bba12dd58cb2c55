use super::*;
use crate::{
    config::{NullBinding, PlaceholderStyle},
    obs::MemorySink,
    schema::ReferenceKind,
    test_fixtures::{OrderEntity, UserEntity, resolver},
    value::Value,
};
use proptest::prelude::*;
use serde_json::json;

///
/// HELPERS
///

fn lenient_users() -> (Criteria, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let criteria = Criteria::builder()
        .entity_kind::<UserEntity>()
        .resolver(resolver())
        .sink(sink.clone())
        .config(CriteriaConfig::default().with_strict(false))
        .build()
        .unwrap();

    (criteria, sink)
}

fn aliased_users() -> Criteria {
    Criteria::builder()
        .entity_kind::<UserEntity>()
        .resolver(resolver())
        .config(CriteriaConfig::default().with_alias_enabled(true))
        .build()
        .unwrap()
}

fn keys(criteria: &Criteria) -> Vec<String> {
    criteria.parameters().keys().map(str::to_string).collect()
}

///
/// PREDICATES
///

#[test]
fn eq_binds_one_parameter() {
    let mut c = Criteria::new();
    c.eq("name", "bob").unwrap();

    assert_eq!(c.segment(), "name = #{p1}");
    assert_eq!(c.parameters().get("p1"), Some(&Value::Text("bob".into())));
}

#[test]
fn comparison_family_renders_symbols() {
    let mut c = Criteria::new();
    c.ne("a", 1)
        .unwrap()
        .gt("b", 2)
        .unwrap()
        .ge("c", 3)
        .unwrap()
        .lt("d", 4)
        .unwrap()
        .le("e", 5)
        .unwrap();

    assert_eq!(
        c.segment(),
        "a <> #{p1} AND b > #{p2} AND c >= #{p3} AND d < #{p4} AND e <= #{p5}"
    );
}

#[test]
fn raw_column_in_list() {
    let mut c = Criteria::new();
    c.in_list(col("status"), [1, 2, 3]).unwrap();

    assert_eq!(c.segment(), "status IN (#{p1}, #{p2}, #{p3})");
    assert_eq!(keys(&c), ["p1", "p2", "p3"]);
}

#[test]
fn empty_in_list_renders_constant_without_parameters() {
    let mut c = Criteria::new();
    c.in_list("status", Vec::<i64>::new())
        .unwrap()
        .not_in("kind", Vec::<i64>::new())
        .unwrap();

    assert_eq!(c.segment(), "1 = 0 AND 1 = 1");
    assert!(c.parameters().is_empty());
}

#[test]
fn like_family_wraps_arguments() {
    let mut c = Criteria::new();
    c.like("name", "bo")
        .unwrap()
        .like_left("email", "@x.io")
        .unwrap()
        .like_right("status", "act")
        .unwrap()
        .not_like("name", "tmp")
        .unwrap();

    assert_eq!(
        c.segment(),
        "name LIKE #{p1} AND email LIKE #{p2} AND status LIKE #{p3} AND name NOT LIKE #{p4}"
    );
    let values: Vec<_> = c.parameters().values().cloned().collect();
    assert_eq!(
        values,
        [
            Value::Text("%bo%".into()),
            Value::Text("%@x.io".into()),
            Value::Text("act%".into()),
            Value::Text("%tmp%".into()),
        ]
    );
}

#[test]
fn like_escape_renders_escape_char() {
    let mut c = Criteria::new();
    c.like_escape("name", "50!%", FuzzyMode::Prefix, '!').unwrap();

    assert_eq!(c.segment(), "name LIKE #{p1} ESCAPE '!'");
    assert_eq!(c.parameters().get("p1"), Some(&Value::Text("50!%%".into())));
}

#[test]
fn between_and_nullability() {
    let mut c = Criteria::new();
    c.between("age", 18, 65)
        .unwrap()
        .not_between("score", 0, 10)
        .unwrap()
        .is_null("deleted_at")
        .unwrap()
        .is_not_null("email")
        .unwrap();

    assert_eq!(
        c.segment(),
        "age BETWEEN #{p1} AND #{p2} AND score NOT BETWEEN #{p3} AND #{p4} \
         AND deleted_at IS NULL AND email IS NOT NULL"
    );
}

#[test]
fn or_next_applies_to_one_predicate() {
    let mut c = Criteria::new();
    c.eq("a", 1)
        .unwrap()
        .or_next()
        .eq("b", 2)
        .unwrap()
        .eq("c", 3)
        .unwrap();

    assert_eq!(c.segment(), "a = #{p1} OR b = #{p2} AND c = #{p3}");
}

#[test]
fn leading_or_is_never_rendered() {
    let mut c = Criteria::new();
    c.or_next().eq("a", 1).unwrap();

    assert_eq!(c.segment(), "a = #{p1}");
}

#[test]
fn null_is_bound_as_null_unless_configured() {
    let mut c = Criteria::new();
    c.eq("a", None::<i64>).unwrap();
    assert_eq!(c.parameters().get("p1"), Some(&Value::Null));

    let mut c = Criteria::builder()
        .config(CriteriaConfig::default().with_null_binding(NullBinding::LiteralText))
        .build()
        .unwrap();
    c.eq("a", None::<i64>).unwrap();
    assert_eq!(
        c.parameters().get("p1"),
        Some(&Value::Text(NULL_SENTINEL.into()))
    );
}

#[test]
fn placeholder_style_follows_config() {
    let mut c = Criteria::builder()
        .config(CriteriaConfig::default().with_placeholder(PlaceholderStyle::At))
        .build()
        .unwrap();
    c.eq("a", 1).unwrap().or_next().eq("b", 2).unwrap();

    assert_eq!(c.segment(), "a = @p1 OR b = @p2");
}

///
/// NESTED GROUPS
///

#[test]
fn and_group_follows_prior_predicate() {
    let mut c = Criteria::new();
    c.eq("x", 0).unwrap();
    c.and(|g| {
        g.eq("a", 1)?;
        g.or_next().eq("b", 2)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(c.segment(), "x = #{p1} AND (a = #{p2} OR b = #{p3})");
    assert_eq!(keys(&c), ["p1", "p2", "p3"]);
}

#[test]
fn negated_groups_and_deep_nesting() {
    let mut c = Criteria::new();
    c.eq("a", 1).unwrap();
    c.or_not(|g| {
        g.eq("b", 2)?;
        g.and(|h| {
            h.or_next().is_null("c")?;
            h.or_next().is_null("d")?;
            Ok(())
        })?;
        Ok(())
    })
    .unwrap();
    c.and_not(|g| {
        g.eq("e", 3)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(
        c.segment(),
        "a = #{p1} OR NOT (b = #{p2} AND (c IS NULL OR d IS NULL)) AND NOT (e = #{p3})"
    );
}

#[test]
fn group_as_first_predicate_has_no_connective() {
    let mut c = Criteria::new();
    c.or(|g| {
        g.eq("a", 1)?;
        g.or_next().eq("b", 2)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(c.segment(), "(a = #{p1} OR b = #{p2})");
}

#[test]
fn empty_group_is_skipped_and_reported() {
    let sink = Arc::new(MemorySink::new());
    let mut c = Criteria::builder().sink(sink.clone()).build().unwrap();
    c.and(|_| Ok(())).unwrap();

    assert!(!c.has_condition());
    assert_eq!(c.where_segment(), "");
    assert!(sink.events().contains(&CriteriaEvent::EmptyGroupSkipped));
}

#[test]
fn failing_group_attaches_nothing() {
    let mut c = Criteria::new();
    let err = c
        .and(|g| {
            g.eq("a", 1)?;
            g.eq("not an identifier", 2)?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, CriteriaError::InvalidIdentifier { .. }));
    assert!(!c.has_condition());
    // keys drawn before the failure stay in the shared table
    assert_eq!(keys(&c), ["p1"]);
}

#[test]
fn nested_group_inherits_alias() {
    let mut c = aliased_users();
    c.eq(UserEntity::NAME, "bob").unwrap();
    c.or(|g| {
        assert_eq!(g.alias(), "t1");
        g.gt(UserEntity::AGE, 30)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(c.segment(), "t1.name = #{p1} OR (t1.age > #{p2})");
}

///
/// RAW SQL AND TEMPLATES
///

#[test]
fn apply_passes_raw_text_through() {
    let mut c = Criteria::new();
    c.apply("AND deleted = 0").unwrap();
    c.apply("   ").unwrap();
    c.eq("a", 1).unwrap();
    c.apply("OR archived = 1").unwrap();

    assert_eq!(c.segment(), "deleted = 0 AND a = #{p1} OR archived = 1");
    assert_eq!(c.fragments().len(), 3);
}

#[test]
fn template_keeps_its_own_connective() {
    let mut c = Criteria::new();
    c.eq("a", 1).unwrap();
    c.template("OR b = {} OR c = {}", [2, 3]).unwrap();
    c.template("d > {0}", [4]).unwrap();

    assert_eq!(
        c.segment(),
        "a = #{p1} OR b = #{p2} OR c = #{p3} AND d > #{p4}"
    );
}

#[test]
fn leading_whitespace_does_not_hide_a_connective() {
    let mut c = Criteria::new();
    c.template("  AND x = {}", [1]).unwrap();
    assert_eq!(c.segment(), "x = #{p1}");

    let mut c = Criteria::new();
    c.apply(" OR y = 1").unwrap();
    c.apply("\n  AND z = 2").unwrap();
    assert_eq!(c.segment(), "y = 1 AND z = 2");

    let mut c = Criteria::new();
    c.eq("a", 1).unwrap();
    c.and(|g| {
        g.apply("\nAND z = 1")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(c.segment(), "a = #{p1} AND (z = 1)");
}

#[test]
fn connective_only_raw_text_is_not_a_condition() {
    let mut c = Criteria::new();
    c.apply("AND ").unwrap();
    c.apply(" or\t").unwrap();
    c.apply("OR").unwrap();

    assert!(!c.has_condition());
    assert_eq!(c.where_segment(), "");
    assert_eq!(c.compile().where_sql, c.where_segment());
}

#[test]
fn connective_only_template_is_blank() {
    let mut c = Criteria::new();
    let err = c.template("  AND ", [1]).unwrap_err();

    assert!(matches!(err, CriteriaError::InvalidValue { .. }));
    assert!(c.parameters().is_empty());
    assert!(!c.has_condition());
}

#[test]
fn pending_slot_replaces_a_spelled_connective() {
    let mut c = Criteria::new();
    c.eq("a", 1).unwrap();
    c.or_next().template("AND b = {}", [2]).unwrap();
    c.template("or c = {}", [3]).unwrap();
    c.with_slot(Slot::And).template_value("OR d = {}", 4).unwrap();

    assert_eq!(
        c.segment(),
        "a = #{p1} OR b = #{p2} OR c = #{p3} AND d = #{p4}"
    );
}

#[test]
fn template_named_and_single_value() {
    let mut c = Criteria::new();
    c.template_named("age BETWEEN {lo} AND {hi}", [("lo", 18), ("hi", 65)])
        .unwrap();
    c.template_value("(name = {} OR nick = {})", "bob").unwrap();

    assert_eq!(
        c.segment(),
        "age BETWEEN #{p1} AND #{p2} AND (name = #{p3} OR nick = #{p3})"
    );
    assert_eq!(keys(&c), ["p1", "p2", "p3"]);
}

///
/// RESOLUTION AND MODES
///

#[test]
fn bound_context_resolves_properties() {
    let mut c = Criteria::for_entity::<UserEntity>(resolver());
    c.ge(UserEntity::CREATED_AT, 100)
        .unwrap()
        .eq("status", "active")
        .unwrap()
        .is_not_null(col("email"))
        .unwrap();

    assert_eq!(c.entity(), Some("user"));
    assert_eq!(
        c.segment(),
        "created_at >= #{p1} AND status = #{p2} AND email IS NOT NULL"
    );
}

#[test]
fn strict_unknown_property_is_an_error() {
    let mut c = Criteria::for_entity::<UserEntity>(resolver());
    let err = c.eq("nickname", "x").unwrap_err();

    assert!(matches!(
        err,
        CriteriaError::ResolutionFailure {
            kind: ReferenceKind::Property,
            ..
        }
    ));
    assert!(c.parameters().is_empty());
    assert!(!c.has_condition());
}

#[test]
fn lenient_unknown_property_is_skipped_with_warning() {
    let (mut c, sink) = lenient_users();
    c.eq("nickname", "x").unwrap();

    assert!(!c.has_condition());
    assert!(c.parameters().is_empty());
    assert_eq!(sink.warnings().len(), 1);

    c.eq(UserEntity::NAME, "bob").unwrap();
    assert_eq!(c.segment(), "name = #{p1}");
}

#[test]
fn strict_flag_is_copied_into_groups() {
    let (mut c, sink) = lenient_users();
    c.and(|g| {
        assert!(!g.is_strict());
        g.eq("nickname", 1)?;
        g.eq(UserEntity::AGE, 2)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(c.segment(), "(age = #{p1})");
    assert_eq!(sink.warnings().len(), 1);
}

#[test]
fn foreign_criterion_is_rejected() {
    let a = Criteria::new();
    let mut b = Criteria::new();
    let node = ComparisonBuilder::new()
        .criteria(&a)
        .target("x")
        .op(CompareOp::Eq)
        .value(1)
        .build()
        .unwrap();

    let err = b.where_(node).unwrap_err();
    assert!(matches!(
        err,
        CriteriaError::InvalidStateTransition(BuilderStateError::ForeignCriterion)
    ));
    assert!(!b.has_condition());
}

#[test]
fn leaves_are_claimed_at_build_and_groups_on_attach() {
    let a = Criteria::new();
    let mut b = Criteria::new();

    let leaf = NullabilityBuilder::new()
        .criteria(&a)
        .target("x")
        .op(NullOp::IsNull)
        .build()
        .unwrap()
        .unwrap();
    assert!(leaf.owner().is_some_and(Owner::is_set));

    let group = Criterion::nested(Slot::And, false, vec![Criterion::raw("y = 1")]);
    assert!(group.owner().is_some_and(|owner| !owner.is_set()));
    assert!(group.owner().is_some_and(|owner| owner.claim(&a.scope)));

    let err = b.where_(group).unwrap_err();
    assert!(matches!(
        err,
        CriteriaError::InvalidStateTransition(BuilderStateError::ForeignCriterion)
    ));
    assert!(!b.has_condition());
}

#[test]
fn where_attaches_builder_output() {
    let mut c = Criteria::new();
    let node = RangeBuilder::new()
        .criteria(&c)
        .target("id")
        .op(RangeOp::In)
        .values([7_u64, 8])
        .slot(Slot::Or)
        .build()
        .unwrap();
    c.where_(node).unwrap().where_(None::<Criterion>).unwrap();

    assert_eq!(c.segment(), "id IN (#{p1}, #{p2})");
    assert_eq!(c.fragments().len(), 1);
}

#[test]
fn invalid_config_is_rejected_at_build() {
    let config = CriteriaConfig {
        param_prefix: "p.x".into(),
        ..CriteriaConfig::default()
    };

    let err = Criteria::builder().config(config).build().unwrap_err();
    assert!(matches!(err, CriteriaError::Config(_)));
}

///
/// ALIASES AND DERIVED CONTEXTS
///

#[test]
fn aliases_are_disabled_by_default() {
    let mut c = Criteria::new();
    c.eq("a", 1).unwrap();

    assert_eq!(c.alias(), "");
    assert_eq!(c.segment(), "a = #{p1}");
}

#[test]
fn user_alias_overrides_generated() {
    let mut c = aliased_users();
    c.eq(UserEntity::NAME, "bob").unwrap();
    assert_eq!(c.segment(), "t1.name = #{p1}");

    c.set_alias(Some("u"));
    assert_eq!(c.segment(), "u.name = #{p1}");

    c.set_alias(None::<String>);
    assert_eq!(c.alias(), "t1");

    c.enable_alias(false);
    assert_eq!(c.segment(), "name = #{p1}");
}

#[test]
fn derived_context_shares_sequences_but_not_fragments() {
    let mut root = aliased_users();
    root.eq(UserEntity::NAME, "bob").unwrap();

    let mut orders = root.derive_for::<OrderEntity>();
    orders.gt("total", 100).unwrap();

    assert_eq!(orders.alias(), "t2");
    assert_eq!(orders.entity(), Some("order"));
    assert_eq!(orders.segment(), "t2.total > #{p2}");
    assert_eq!(root.segment(), "t1.name = #{p1}");
    assert_eq!(keys(&root), ["p1", "p2"]);
    assert_eq!(root.derive("user").alias(), "t3");
}

#[test]
fn independent_roots_do_not_share_sequences() {
    let mut a = Criteria::new();
    let mut b = Criteria::new();
    a.eq("x", 1).unwrap();
    b.eq("y", 2).unwrap();

    assert_eq!(a.segment(), "x = #{p1}");
    assert_eq!(b.segment(), "y = #{p1}");
}

///
/// OUTPUT
///

#[test]
fn segment_is_idempotent() {
    let mut c = Criteria::new();
    c.eq("a", 1).unwrap().or_next().like("b", "x").unwrap();

    let first = c.segment();
    assert_eq!(c.segment(), first);
    assert_eq!(c.parameters().len(), 2);
}

#[test]
fn where_segment_only_with_condition() {
    let mut c = Criteria::new();
    assert!(!c.has_condition());
    assert_eq!(c.where_segment(), "");

    c.eq("a", 1).unwrap();
    assert_eq!(c.where_segment(), "WHERE a = #{p1}");
}

#[test]
fn compiled_condition_serializes() {
    let mut c = Criteria::new();
    c.eq("name", "bob").unwrap();

    let compiled = c.compile();
    assert_eq!(compiled.where_sql, "WHERE name = #{p1}");
    assert_eq!(
        serde_json::to_value(&compiled).unwrap(),
        json!({
            "sql": "name = #{p1}",
            "where_sql": "WHERE name = #{p1}",
            "params": {"p1": "bob"},
        })
    );

    let empty = Criteria::new().compile();
    assert_eq!(empty.sql, "");
    assert_eq!(empty.where_sql, "");
}

#[test]
fn criteria_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Criteria>();
}

///
/// PROPERTIES
///

#[derive(Clone, Debug)]
enum Step {
    Eq,
    In(usize),
    Between,
    IsNull,
    Template(usize, usize, usize),
    Raw(usize, usize),
    Group(Vec<(bool, Self)>),
}

// leading text for free-form steps
const LEADS: [&str; 4] = ["", "  ", "\n", "\t "];
const CONNECTIVES: [&str; 3] = ["", "AND ", "or "];

fn free_text(lead: usize, connective: usize, body: &str) -> String {
    format!("{}{}{body}", LEADS[lead], CONNECTIVES[connective])
}

fn step() -> impl Strategy<Value = Step> {
    let leaf = prop_oneof![
        Just(Step::Eq),
        (0_usize..4).prop_map(Step::In),
        Just(Step::Between),
        Just(Step::IsNull),
        (1_usize..4, 0..LEADS.len(), 0..CONNECTIVES.len())
            .prop_map(|(n, lead, conn)| Step::Template(n, lead, conn)),
        (0..LEADS.len(), 0..CONNECTIVES.len()).prop_map(|(lead, conn)| Step::Raw(lead, conn)),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec((any::<bool>(), inner), 0..4).prop_map(Step::Group)
    })
}

fn expected_keys(step: &Step) -> usize {
    match step {
        Step::Eq => 1,
        Step::In(n) | Step::Template(n, ..) => *n,
        Step::Between => 2,
        Step::IsNull | Step::Raw(..) => 0,
        Step::Group(steps) => steps.iter().map(|(_, s)| expected_keys(s)).sum(),
    }
}

fn apply_step(c: &mut Criteria, or: bool, step: &Step) -> Result<(), CriteriaError> {
    if or {
        c.or_next();
    }
    match step {
        Step::Eq => c.eq("a", 1).map(|_| ()),
        Step::In(n) => c.in_list("b", (0_i64..).take(*n)).map(|_| ()),
        Step::Between => c.between("c", 1, 2).map(|_| ()),
        Step::IsNull => c.is_null("d").map(|_| ()),
        Step::Template(n, lead, conn) => {
            let pattern = free_text(*lead, *conn, &vec!["e = {}"; *n].join(" OR "));
            c.template(pattern, (0_i64..).take(*n)).map(|_| ())
        }
        Step::Raw(lead, conn) => c.apply(free_text(*lead, *conn, "f = 1")).map(|_| ()),
        Step::Group(steps) => c
            .and(|g| {
                for (or, step) in steps {
                    apply_step(g, *or, step)?;
                }
                Ok(())
            })
            .map(|_| ()),
    }
}

proptest! {
    #[test]
    fn keys_match_allocated_placeholders(steps in prop::collection::vec((any::<bool>(), step()), 0..10)) {
        let mut c = Criteria::new();
        for (or, step) in &steps {
            apply_step(&mut c, *or, step).unwrap();
        }

        let expected: usize = steps.iter().map(|(_, s)| expected_keys(s)).sum();
        let table = keys(&c);
        let sequenced: Vec<String> = (1..=expected).map(|n| format!("p{n}")).collect();
        prop_assert_eq!(&table, &sequenced);

        let attached: Vec<String> = c
            .fragments()
            .nodes()
            .iter()
            .flat_map(Criterion::params)
            .map(|p| p.key.clone())
            .collect();
        prop_assert_eq!(attached, table);
    }

    #[test]
    fn no_scope_opens_with_a_connective(steps in prop::collection::vec((any::<bool>(), step()), 1..10)) {
        let mut c = Criteria::new();
        for (or, step) in &steps {
            apply_step(&mut c, *or, step).unwrap();
        }

        let sql = c.segment();
        let upper = sql.to_uppercase();
        prop_assert!(!upper.starts_with("AND ") && !upper.starts_with("OR "));
        prop_assert!(!upper.contains("(AND ") && !upper.contains("(OR "));
        for doubled in ["AND AND ", "AND OR ", "OR AND ", "OR OR "] {
            prop_assert!(!upper.contains(doubled), "{} in {}", doubled, sql);
        }
        prop_assert!(!sql.starts_with(char::is_whitespace) && !sql.contains("( "));
        prop_assert!(!sql.contains("  ") && !sql.contains('\n') && !sql.contains('\t'));
        prop_assert_eq!(c.segment(), sql);
    }
}
