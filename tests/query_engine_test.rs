// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Query Engine Tests
//!
//! Conditions, joins and set operations through the public API.

use arbordb::{
    row, Condition, DataType, Database, Error, ExecResult, Executor, IndexDeclaration, IndexType,
    Operand, Operator, ParsedQuery, Projection, QueryContext, Row, SchemaBuilder, Table,
    TableKind, TableRef, Value,
};

const KINDS: [TableKind; 4] = [
    TableKind::Set,
    TableKind::Hash,
    TableKind::BPlusTree,
    TableKind::MultiIndex,
];

fn indexes(kind: TableKind) -> Vec<IndexDeclaration> {
    match kind {
        TableKind::MultiIndex => vec![
            IndexDeclaration::new(0, IndexType::BPlusTree),
            IndexDeclaration::new(1, IndexType::Hash),
        ],
        _ => Vec::new(),
    }
}

fn join_db(a_kind: TableKind, b_kind: TableKind) -> Database {
    let mut db = Database::open_in_memory();
    let a = SchemaBuilder::new("a")
        .add("k", DataType::Integer)
        .add("v", DataType::Integer)
        .build();
    let b = SchemaBuilder::new("b")
        .add("k", DataType::Integer)
        .add("w", DataType::Integer)
        .build();
    db.create_table(a, &indexes(a_kind), Some(a_kind)).unwrap();
    db.create_table(b, &indexes(b_kind), Some(b_kind)).unwrap();
    for r in [row![1, 10], row![1, 11], row![2, 20]] {
        db.insert("a", r).unwrap();
    }
    for r in [row![1, 100], row![2, 200], row![3, 300]] {
        db.insert("b", r).unwrap();
    }
    db
}

fn sorted(mut rows: Vec<Row>) -> Vec<Row> {
    rows.sort();
    rows
}

fn eq_attrs(lt: &str, lc: &str, rt: &str, rc: &str) -> Condition {
    Condition::compare(Operand::attr(lt, lc), Operator::Eq, Operand::attr(rt, rc))
}

#[test]
fn test_join_matches_on_every_backend_pair() {
    for a_kind in KINDS {
        for b_kind in KINDS {
            let db = join_db(a_kind, b_kind);
            let rs = db
                .select(
                    &[TableRef::new("a"), TableRef::new("b")],
                    &[eq_attrs("a", "k", "b", "k")],
                    &[Projection::All],
                )
                .unwrap();
            assert_eq!(rs.columns, vec!["a.k", "a.v", "b.k", "b.w"]);
            assert_eq!(
                sorted(rs.rows),
                vec![row![1, 10, 1, 100], row![1, 11, 1, 100], row![2, 20, 2, 200]],
                "{} x {}",
                a_kind,
                b_kind
            );
        }
    }
}

#[test]
fn test_theta_join() {
    let db = join_db(TableKind::BPlusTree, TableKind::BPlusTree);
    let c = Condition::compare(Operand::attr("a", "k"), Operator::Gt, Operand::attr("b", "k"));
    let rs = db
        .select(
            &[TableRef::new("a"), TableRef::new("b")],
            &[c],
            &[Projection::column("a", "v"), Projection::column("b", "w")],
        )
        .unwrap();
    assert_eq!(sorted(rs.rows), vec![row![20, 100]]);
}

#[test]
fn test_or_across_provenance() {
    let db = join_db(TableKind::Hash, TableKind::Set);
    // a.v = 20 OR a.k = b.k over FROM a, b
    let conditions = [
        Condition::compare(Operand::attr("a", "v"), Operator::Eq, Operand::constant(20)),
        eq_attrs("a", "k", "b", "k"),
        Condition::Or,
    ];
    let rs = db
        .select(
            &[TableRef::new("a"), TableRef::new("b")],
            &conditions,
            &[Projection::All],
        )
        .unwrap();
    // (2,20) paired with all of b, plus the two (1,*) join matches
    assert_eq!(rs.len(), 5);

    let ctx = QueryContext::with_tables(vec![
        db.table("a").unwrap().generate_alias("a"),
        db.table("b").unwrap().generate_alias("b"),
    ])
    .unwrap();
    let exec = Executor::new(&ctx);
    let left = exec.query(&conditions[0]).unwrap();
    assert_eq!(left.sources().len(), 1);
    let right = exec.query(&conditions[1]).unwrap();
    let union = exec.union(left, right).unwrap();
    assert_eq!(
        union.sources().iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
}

#[test]
fn test_and_narrows() {
    let db = join_db(TableKind::MultiIndex, TableKind::BPlusTree);
    let conditions = [
        eq_attrs("a", "k", "b", "k"),
        Condition::compare(Operand::attr("b", "w"), Operator::Lt, Operand::constant(150)),
        Condition::compare(Operand::constant(11), Operator::Lte, Operand::attr("a", "v")),
        Condition::And,
        Condition::And,
    ];
    let rs = db
        .select(
            &[TableRef::new("a"), TableRef::new("b")],
            &conditions,
            &[Projection::column("a", "v")],
        )
        .unwrap();
    assert_eq!(rs.rows, vec![row![11]]);
}

#[test]
fn test_no_conditions_is_a_product() {
    let db = join_db(TableKind::Set, TableKind::Hash);
    let rs = db
        .select(&[TableRef::new("a"), TableRef::new("b")], &[], &[])
        .unwrap();
    assert_eq!(rs.len(), 9);
    assert_eq!(rs.columns.len(), 4);
}

#[test]
fn test_query_errors() {
    let db = join_db(TableKind::Set, TableKind::Set);
    let from = [TableRef::new("a"), TableRef::new("b")];

    let ambiguous = Condition::compare(Operand::column("k"), Operator::Eq, Operand::constant(1));
    assert_eq!(
        db.select(&from, &[ambiguous], &[]).unwrap_err(),
        Error::AmbiguousColumn("k".to_string())
    );

    let unknown = Condition::compare(Operand::column("zz"), Operator::Eq, Operand::constant(1));
    assert!(db.select(&from, &[unknown], &[]).unwrap_err().is_not_found());

    let mismatch = Condition::compare(Operand::column("w"), Operator::Eq, Operand::constant("x"));
    assert!(matches!(
        db.select(&from, &[mismatch], &[]),
        Err(Error::TypeMismatch { .. })
    ));

    let dangling = [Condition::And];
    assert!(matches!(
        db.select(&from, &dangling, &[]),
        Err(Error::MalformedCondition(_))
    ));

    assert!(db
        .select(&[TableRef::new("missing")], &[], &[])
        .unwrap_err()
        .is_not_found());

    // Failed queries leave the tables untouched
    assert_eq!(db.table("a").unwrap().len(), 3);
    assert_eq!(db.table("b").unwrap().len(), 3);
}

#[test]
fn test_same_table_twice_under_aliases() {
    let mut db = Database::open_in_memory();
    db.execute(&ParsedQuery::create_table(
        "emp",
        vec![
            ("id".to_string(), DataType::Integer),
            ("boss".to_string(), DataType::Integer),
        ],
        Some(0),
        vec![IndexDeclaration::new(0, IndexType::BPlusTree)],
    ))
    .unwrap();
    for (id, boss) in [(1, None), (2, Some(1)), (3, Some(1)), (4, Some(2))] {
        let boss = boss.map_or(Value::Null, Value::integer);
        let r = ParsedQuery::insert("emp", vec![Value::integer(id), boss]);
        assert!(matches!(db.execute(&r).unwrap(), ExecResult::Inserted(c) if c.is_success()));
    }

    let q = ParsedQuery::select(
        vec![TableRef::aliased("emp", "e"), TableRef::aliased("emp", "m")],
        vec![eq_attrs("e", "boss", "m", "id")],
        vec![Projection::column("e", "id"), Projection::column("m", "id")],
    );
    let ExecResult::Rows(rs) = db.execute(&q).unwrap() else {
        panic!("select returns rows");
    };
    assert_eq!(rs.columns, vec!["e.id", "m.id"]);
    assert_eq!(sorted(rs.rows), vec![row![2, 1], row![3, 1], row![4, 2]]);
}
