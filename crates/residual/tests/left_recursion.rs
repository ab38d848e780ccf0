// Cyclic grammars: left recursion, mutual recursion, derivative identity.

use residual::{alt, con, epsilon, recursion, red, terminal, Error, Label, Parser, Recursion};

/// L = ε | L 'a', collecting the matched characters.
fn left_list() -> Recursion<char, Vec<char>> {
    let list = recursion::<char, Vec<char>>();
    let grow = red(con(list.parser(), terminal('a')), |(mut items, a): (Vec<char>, char)| {
        items.push(a);
        items
    });
    list.bind(alt([epsilon([Vec::new()]), grow])).expect("binding a fresh recursion succeeds");
    list
}

fn forest(parser: &Parser<char, Vec<char>>, input: &str) -> Vec<Vec<char>> {
    let chars: Vec<char> = input.chars().collect();
    parser.parse_full(&chars).expect("parse succeeds").into_iter().collect()
}

#[test]
fn left_recursive_list_attributes() {
    let list = left_list();
    let parser = list.parser();
    assert!(!parser.is_empty().expect("query succeeds"));
    assert!(parser.is_nullable().expect("query succeeds"));
    let null = parser.parse_null().expect("query succeeds");
    assert_eq!(null.len(), 1);
    assert!(null.contains(&Vec::new()));
}

#[test]
fn left_recursive_list_parses() {
    let parser = left_list().parser();
    assert_eq!(forest(&parser, ""), vec![Vec::<char>::new()]);
    assert_eq!(forest(&parser, "a"), vec![vec!['a']]);
    assert_eq!(forest(&parser, "aa"), vec![vec!['a', 'a']]);
    assert_eq!(forest(&parser, "aaaa"), vec![vec!['a'; 4]]);
    assert!(forest(&parser, "ab").is_empty());
    assert!(forest(&parser, "b").is_empty());
}

#[test]
fn derivatives_are_identity_stable_across_a_cycle() {
    let parser = left_list().parser();
    let once = parser.derive(&'a').expect("derive succeeds");
    let twice = parser.derive(&'a').expect("derive succeeds");
    assert_eq!(once.id(), twice.id(), "memoized derivative is one object");

    // The same holds one level down, where the derivative graph is cyclic.
    let deeper_once = once.derive(&'a').expect("derive succeeds");
    let deeper_twice = once.derive(&'a').expect("derive succeeds");
    assert_eq!(deeper_once.id(), deeper_twice.id());
}

#[test]
fn deriving_a_recursion_defers() {
    let parser = left_list().parser();
    let derived = parser.derive(&'a').expect("derive succeeds");
    let graph = derived.graph().expect("walk succeeds");
    assert_eq!(graph.get(derived.id()).expect("root recorded").label, Label::Future);
}

#[test]
fn right_recursion_also_works() {
    // R = ε | 'a' R, counting the 'a's.
    let tail = recursion::<char, u32>();
    let grow = red(con(terminal('a'), tail.parser()), |(_, n): (char, u32)| n + 1);
    tail.bind(alt([epsilon([0u32]), grow])).expect("bind succeeds");

    let parser = tail.parser();
    let input: Vec<char> = "aaa".chars().collect();
    let result = parser.parse_full(&input).expect("parse succeeds");
    assert_eq!(result.len(), 1);
    assert!(result.contains(&3));
}

#[test]
fn mutual_recursion_across_two_nonterminals() {
    // S = ε | 'a' B and B = 'b' S recognize (ab)*, counting the pairs.
    let s = recursion::<char, u32>();
    let b = recursion::<char, u32>();
    s.bind(alt([
        epsilon([0u32]),
        red(con(terminal('a'), b.parser()), |(_, n): (char, u32)| n + 1),
    ]))
    .expect("bind succeeds");
    b.bind(red(con(terminal('b'), s.parser()), |(_, n): (char, u32)| n))
        .expect("bind succeeds");

    let parser = s.parser();
    let parse = |input: &str| {
        let chars: Vec<char> = input.chars().collect();
        parser.parse_full(&chars).expect("parse succeeds")
    };
    assert!(parse("").contains(&0));
    assert!(parse("ab").contains(&1));
    assert!(parse("abab").contains(&2));
    assert!(parse("aba").is_empty());
    assert!(parse("ba").is_empty());
}

#[test]
fn ambiguous_left_recursion_collects_every_parse() {
    // E = 'x' | E '+' E as nesting depth: "x+x+x" associates two ways but
    // both parses count the same two additions, so the forest collapses to
    // one value; "x+x" yields one.
    let e = recursion::<char, u32>();
    let add = red(
        con(con(e.parser(), terminal('+')), e.parser()),
        |((left, _), right): ((u32, char), u32)| left + right + 1,
    );
    e.bind(alt([red(terminal('x'), |_| 0u32), add])).expect("bind succeeds");

    let parser = e.parser();
    let parse = |input: &str| {
        let chars: Vec<char> = input.chars().collect();
        parser.parse_full(&chars).expect("parse succeeds")
    };
    assert!(parse("x").contains(&0));
    assert!(parse("x+x").contains(&1));
    let three = parse("x+x+x");
    assert_eq!(three.len(), 1, "both associations reduce to the same value");
    assert!(three.contains(&2));
    assert!(parse("x+").is_empty());
}

#[test]
fn cyclic_graph_walk_terminates_and_closes() {
    let parser = left_list().parser();
    let graph = parser.graph().expect("walk succeeds");
    // Recursion, union, epsilon, reduction, concatenation, terminal.
    assert_eq!(graph.len(), 6);
    for node in graph.iter() {
        for child in &node.children {
            assert!(graph.get(*child).is_some());
        }
    }
}

#[test]
fn unbound_recursion_is_an_error_not_a_hang() {
    let rec = recursion::<char, char>();
    let parser = rec.parser();
    let err = parser.parse_full(&['a']).expect_err("query must fail");
    assert!(matches!(err, Error::UnboundRecursion(_)));
}

#[test]
fn nested_recursions() {
    // Outer = ε | Outer Inner, Inner = '[' Outer ']' — nested bracket
    // groups, counted.
    let outer = recursion::<char, u32>();
    let inner = red(
        con(con(terminal('['), outer.parser()), terminal(']')),
        |((_, n), _): ((char, u32), char)| n + 1,
    );
    let grow = red(con(outer.parser(), inner), |(a, b): (u32, u32)| a + b);
    outer.bind(alt([epsilon([0u32]), grow])).expect("bind succeeds");

    let parser = outer.parser();
    let parse = |input: &str| {
        let chars: Vec<char> = input.chars().collect();
        parser.parse_full(&chars).expect("parse succeeds")
    };
    assert!(parse("").contains(&0));
    assert!(parse("[]").contains(&1));
    assert!(parse("[[]]").contains(&2));
    assert!(parse("[][]").contains(&2));
    assert!(parse("[[]").is_empty());
}
