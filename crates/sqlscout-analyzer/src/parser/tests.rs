//! Tests for the parser adapter

use super::*;
use crate::tree::NodeKind;
use indoc::indoc;

fn generic(sql: &str) -> SqlTree {
    parse(sql, SqlDialect::Generic).unwrap()
}

mod dialect_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_str() {
        assert_eq!("sqlite".parse(), Ok(SqlDialect::Sqlite));
        assert_eq!("PostgreSQL".parse(), Ok(SqlDialect::Postgres));
        assert_eq!("mariadb".parse(), Ok(SqlDialect::Mysql));
        assert_eq!("ansi".parse(), Ok(SqlDialect::Generic));
        assert!("oracle".parse::<SqlDialect>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        for dialect in [
            SqlDialect::Generic,
            SqlDialect::Sqlite,
            SqlDialect::Postgres,
            SqlDialect::Mysql,
        ] {
            assert_eq!(dialect.to_string().parse(), Ok(dialect));
        }
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&SqlDialect::Postgres).unwrap();
        assert_eq!(json, "\"postgres\"");
    }

    #[test]
    fn test_every_dialect_parses_a_basic_query() {
        for dialect in [
            SqlDialect::Generic,
            SqlDialect::Sqlite,
            SqlDialect::Postgres,
            SqlDialect::Mysql,
        ] {
            let tree = parse("SELECT id FROM users WHERE email LIKE '%a'", dialect).unwrap();
            assert_eq!(tree.find_all(NodeKind::Like).count(), 1, "{dialect}");
        }
    }
}

mod statement_count_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("", SqlDialect::Generic), Err(ParseError::Empty));
        assert_eq!(parse("  \n ", SqlDialect::Generic), Err(ParseError::Empty));
    }

    #[test]
    fn test_multiple_statements() {
        assert_eq!(
            parse("SELECT 1; SELECT 2", SqlDialect::Generic),
            Err(ParseError::MultipleStatements(2))
        );
    }

    #[test]
    fn test_trailing_semicolon_is_one_statement() {
        assert!(parse("SELECT 1;", SqlDialect::Generic).is_ok());
    }

    #[test]
    fn test_syntax_error() {
        let err = parse("SELEKT * FORM t", SqlDialect::Generic).unwrap_err();
        assert!(matches!(err, ParseError::Syntax(_)));
        assert!(!err.to_string().is_empty());
    }
}

mod statement_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_with_cte() {
        let tree = generic("WITH t AS (SELECT * FROM users) SELECT id FROM t");
        assert_eq!(tree.root().kind(), NodeKind::Query);
        assert_eq!(tree.find_all(NodeKind::Select).count(), 2);
        assert_eq!(
            tree.to_string(),
            "WITH t AS (SELECT * FROM users) SELECT id FROM t"
        );
    }

    #[test]
    fn test_insert_select() {
        let tree = generic(
            "INSERT INTO archive (id) SELECT id FROM users WHERE LOWER(email) = 'x'",
        );
        assert_eq!(tree.root().kind(), NodeKind::Insert);
        assert_eq!(tree.find_all(NodeKind::Where).count(), 1);
        assert_eq!(tree.find_all(NodeKind::Function).count(), 1);
    }

    #[test]
    fn test_insert_values() {
        let tree = generic("INSERT INTO t (a, b) VALUES (1, 'x')");
        assert_eq!(tree.find_all(NodeKind::Values).count(), 1);
        assert_eq!(tree.to_string(), "INSERT INTO t (a, b) VALUES (1, 'x')");
    }

    #[test]
    fn test_update() {
        let tree = generic("UPDATE users SET name = 'x' WHERE LOWER(email) = 'a'");
        assert_eq!(tree.root().kind(), NodeKind::Update);
        assert_eq!(tree.find_all(NodeKind::Where).count(), 1);
        assert_eq!(
            tree.to_string(),
            "UPDATE users SET name = 'x' WHERE LOWER(email) = 'a'"
        );
    }

    #[test]
    fn test_update_with_joined_table() {
        let tree = generic("UPDATE users AS u SET name = 'x' WHERE TRIM(u.name) = ''");
        let Node::Update(update) = tree.root() else {
            panic!("expected UPDATE");
        };
        assert_eq!(
            *update.table.relation,
            Node::Table(TableRef {
                name: "users".to_string(),
                alias: Some("u".to_string()),
            })
        );
        assert_eq!(tree.find_all(NodeKind::Function).count(), 1);
    }

    #[test]
    fn test_delete() {
        let tree = generic("DELETE FROM users WHERE id = 1");
        assert_eq!(tree.root().kind(), NodeKind::Delete);
        assert_eq!(tree.to_string(), "DELETE FROM users WHERE id = 1");
    }

    #[test]
    fn test_unmodeled_statement_is_raw() {
        let tree = generic("CREATE TABLE t (id INTEGER PRIMARY KEY)");
        assert_eq!(tree.root().kind(), NodeKind::Raw);
        assert_eq!(tree.iter_nodes().count(), 1);
    }

    #[test]
    fn test_multiline_query() {
        let tree = generic(indoc! {"
            SELECT o.id, c.name
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.total > 100
            ORDER BY o.created_at DESC
        "});
        assert_eq!(
            tree.to_string(),
            "SELECT o.id, c.name FROM orders AS o JOIN customers AS c ON c.id = o.customer_id \
             WHERE o.total > 100 ORDER BY o.created_at DESC"
        );
    }
}

mod expression_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first(tree: &SqlTree, kind: NodeKind) -> Node {
        tree.find_all(kind).next().cloned().unwrap()
    }

    #[test]
    fn test_join_kinds() {
        let cases = [
            ("SELECT 1 FROM a JOIN b", JoinKind::Inner),
            ("SELECT 1 FROM a INNER JOIN b ON a.x = b.x", JoinKind::Inner),
            ("SELECT 1 FROM a LEFT OUTER JOIN b ON a.x = b.x", JoinKind::Left),
            ("SELECT 1 FROM a RIGHT JOIN b ON a.x = b.x", JoinKind::Right),
            ("SELECT 1 FROM a FULL JOIN b ON a.x = b.x", JoinKind::Full),
            ("SELECT 1 FROM a CROSS JOIN b", JoinKind::Cross),
        ];
        for (sql, expected) in cases {
            let tree = generic(sql);
            let join = first(&tree, NodeKind::Join);
            assert_eq!(join.as_join().map(|join| join.kind), Some(expected), "{sql}");
        }
    }

    #[test]
    fn test_join_constraints() {
        let tree = generic("SELECT 1 FROM a JOIN b USING (id) NATURAL JOIN c JOIN d");
        let constraints: Vec<_> = tree
            .find_all(NodeKind::Join)
            .filter_map(|node| node.as_join())
            .map(|join| join.constraint.clone())
            .collect();
        assert_eq!(
            constraints,
            vec![
                JoinConstraint::Using(vec!["id".to_string()]),
                JoinConstraint::Natural,
                JoinConstraint::None,
            ]
        );
    }

    #[test]
    fn test_comma_join_constraint() {
        let tree = generic("SELECT 1 FROM a, b");
        let join = first(&tree, NodeKind::Join);
        let join = join.as_join().unwrap();
        assert_eq!(join.kind, JoinKind::Comma);
        assert_eq!(join.constraint, JoinConstraint::None);
        assert_eq!(join.to_string(), ", b");
    }

    #[test]
    fn test_like_escape() {
        let tree = generic("SELECT 1 FROM t WHERE code NOT ILIKE '%!_x' ESCAPE '!'");
        let like = first(&tree, NodeKind::Like);
        let like = like.as_like().unwrap();
        assert_eq!(like.escape.as_deref(), Some("!"));
        assert_eq!(like.literal_pattern(), Some("%!_x"));
        assert_eq!(
            tree.to_string(),
            "SELECT 1 FROM t WHERE code NOT ILIKE '%!_x' ESCAPE '!'"
        );
    }

    #[test]
    fn test_like_variants() {
        let tree = generic("SELECT 1 FROM t WHERE a ILIKE '%x' OR b NOT LIKE 'y%'");
        let likes: Vec<_> = tree
            .find_all(NodeKind::Like)
            .filter_map(|node| node.as_like())
            .map(|like| (like.case_insensitive, like.negated, like.literal_pattern()))
            .collect();
        assert_eq!(
            likes,
            vec![(true, false, Some("%x")), (false, true, Some("y%"))]
        );
    }

    #[test]
    fn test_placeholder() {
        let tree = generic("SELECT 1 FROM t WHERE a = ?");
        assert_eq!(first(&tree, NodeKind::Parameter), Node::Parameter("?".to_string()));
    }

    #[test]
    fn test_order_direction() {
        let tree = generic("SELECT a FROM t ORDER BY a, b DESC, c ASC");
        let Node::OrderBy(terms) = first(&tree, NodeKind::OrderBy) else {
            panic!("expected ORDER BY");
        };
        let directions: Vec<_> = terms.iter().map(|term| term.descending).collect();
        assert_eq!(directions, vec![None, Some(true), Some(false)]);
    }

    #[test]
    fn test_function_shape() {
        let tree = generic("SELECT count(DISTINCT email) FROM users");
        let Node::Function(function) = first(&tree, NodeKind::Function) else {
            panic!("expected function");
        };
        assert_eq!(function.name, "COUNT");
        assert!(function.distinct);
        assert!(function.parenthesized);
        assert_eq!(function.args, vec![Node::Column(vec!["email".to_string()])]);
    }

    #[test]
    fn test_keyword_call_shape() {
        let tree = generic("SELECT SUBSTRING(name FROM 2 FOR 3) FROM users");
        let Node::Function(function) = first(&tree, NodeKind::Function) else {
            panic!("expected function");
        };
        assert_eq!(function.name, "SUBSTRING");
        assert_eq!(function.args.len(), 3);
        assert_eq!(
            function.syntax,
            CallSyntax::Keyword {
                prefix: None,
                separators: vec!["FROM", "FOR"],
            }
        );
    }

    #[test]
    fn test_builtin_calls_keep_arguments() {
        for (sql, name) in [
            ("SELECT 1 FROM t WHERE TRIM(LOWER(a)) = 'x'", "TRIM"),
            ("SELECT 1 FROM t WHERE EXTRACT(YEAR FROM LOWER(a)) = 1", "EXTRACT"),
            ("SELECT 1 FROM t WHERE CEIL(LOWER(a)) = 1", "CEIL"),
            ("SELECT 1 FROM t WHERE FLOOR(LOWER(a)) = 1", "FLOOR"),
            ("SELECT 1 FROM t WHERE POSITION('x' IN LOWER(a)) = 1", "POSITION"),
            ("SELECT 1 FROM t WHERE OVERLAY(LOWER(a) PLACING 'x' FROM 1) = 'x'", "OVERLAY"),
        ] {
            let names: Vec<_> = generic(sql)
                .find_all(NodeKind::Function)
                .filter_map(|node| match node {
                    Node::Function(function) => Some(function.name.clone()),
                    _ => None,
                })
                .collect();
            assert_eq!(names, vec![name.to_string(), "LOWER".to_string()], "{sql}");
        }
    }

    #[test]
    fn test_predicate_wrappers_are_not_raw() {
        for sql in [
            "SELECT 1 FROM t WHERE (a = 1) IS TRUE",
            "SELECT 1 FROM t WHERE a IS NOT DISTINCT FROM b",
            "SELECT 1 FROM t WHERE a = ANY(SELECT b FROM u)",
            "SELECT 1 FROM t WHERE a > ALL(SELECT b FROM u)",
            "SELECT 1 FROM t WHERE (a, b) IN ((1, 2))",
            "SELECT 1 FROM t WHERE a COLLATE nocase = 'x'",
        ] {
            assert_eq!(generic(sql).find_all(NodeKind::Raw).count(), 0, "{sql}");
        }
    }

    #[test]
    fn test_cast_is_modeled() {
        let tree = generic("SELECT 1 FROM t WHERE CAST(a AS TEXT) = 'x'");
        assert_eq!(tree.find_all(NodeKind::Cast).count(), 1);
    }

    #[test]
    fn test_qualified_wildcard() {
        let tree = generic("SELECT t.* FROM t");
        assert_eq!(
            first(&tree, NodeKind::Wildcard),
            Node::Wildcard(Some("t".to_string()))
        );
    }
}
