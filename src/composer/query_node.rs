use std::fmt;

use crate::composer::{ClauseKind, Condition, Connective, JoinKind, Limit};

/// Text of one clause plus the `AND`/`OR` lines continued onto it.
///
/// Indentation is not stored; it is applied at render time from the owning
/// node's depth, so re-parenting a node keeps its output consistent.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClauseText {
    pub head: String,
    pub continuations: Vec<(Connective, String)>,
}

impl ClauseText {
    pub fn new(head: String) -> Self {
        Self { head, continuations: vec![] }
    }

    fn render_into(&self, out: &mut String, indent: &str) {
        out.push_str(indent);
        out.push_str(&self.head);
        out.push('\n');
        for (connective, fragment) in &self.continuations {
            out.push_str(indent);
            out.push_str(connective.keyword());
            out.push(' ');
            out.push_str(fragment);
            out.push('\n');
        }
    }
}

/// One SELECT block.
///
/// Holds the clause state of a single statement level and at most one
/// child node, which replaces the `FROM` clause when rendered. Clause calls
/// may arrive in any order; [`QueryNode::render`] always emits them as
/// preamble, SELECT, FROM, JOINs, WHERE, GROUP BY, HAVING, ORDER BY, LIMIT.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct QueryNode {
    is_subquery: bool,
    alias: String,
    depth: usize,
    preamble: Vec<String>,
    select_list: Vec<String>,
    from_clause: Option<ClauseText>,
    joins: Vec<ClauseText>,
    where_clause: Option<ClauseText>,
    group_by: Option<ClauseText>,
    having: Option<ClauseText>,
    order_by: Option<ClauseText>,
    limit: Option<Limit>,
    child: Option<Box<QueryNode>>,
    last_clause: ClauseKind,
}

impl QueryNode {
    /// A root (non nested) node.
    pub fn new() -> Self {
        Self::default()
    }

    /// A root node whose preamble is seeded with `start` when non empty.
    pub fn with_start(start: &str) -> Self {
        let mut node = Self::new();
        node.seed(start);
        node
    }

    /// A nested node rendered as `FROM ( ... ) AS alias` at `depth`.
    pub fn subquery(alias: &str, depth: usize) -> Self {
        Self {
            is_subquery: true,
            alias: alias.to_string(),
            depth,
            ..Default::default()
        }
    }

    pub fn subquery_with_start(alias: &str, depth: usize, start: &str) -> Self {
        let mut node = Self::subquery(alias, depth);
        node.seed(start);
        node
    }

    fn seed(&mut self, start: &str) {
        if !start.trim().is_empty() {
            self.set_preamble(start);
        }
    }

    pub fn is_subquery(&self) -> bool { self.is_subquery }
    pub fn alias(&self) -> &str { &self.alias }
    pub fn depth(&self) -> usize { self.depth }
    pub fn last_clause(&self) -> ClauseKind { self.last_clause }
    pub fn has_subquery(&self) -> bool { self.child.is_some() }
    pub fn child(&self) -> Option<&QueryNode> { self.child.as_deref() }
    pub fn child_mut(&mut self) -> Option<&mut QueryNode> { self.child.as_deref_mut() }
    pub fn join_count(&self) -> usize { self.joins.len() }

    /// Number of nested levels below this node.
    pub fn nesting_depth(&self) -> usize {
        match &self.child {
            Some(child) => 1 + child.nesting_depth(),
            None => 0,
        }
    }

    /// Walks `levels` children down, stopping at the deepest existing node.
    pub fn descendant_mut(&mut self, levels: usize) -> &mut QueryNode {
        if levels == 0 {
            return self;
        }

        match self.child {
            Some(ref mut child) => child.descendant_mut(levels - 1),
            None => self,
        }
    }

    pub fn descendant(&self, levels: usize) -> &QueryNode {
        match &self.child {
            Some(child) if levels > 0 => child.descendant(levels - 1),
            _ => self,
        }
    }

    pub fn set_preamble(&mut self, text: &str) -> &mut Self {
        self.preamble.push(format!("{} ", text));
        self
    }

    /// Adds a SELECT line. Repeated calls add repeated lines.
    pub fn select(&mut self, columns: &str) -> &mut Self {
        self.select_list.push(format!("SELECT {} ", columns));
        self
    }

    pub fn from(&mut self, table: &str) -> &mut Self {
        self.from_clause = Some(ClauseText::new(format!("FROM {} ", table)));
        self.last_clause = ClauseKind::From;
        self
    }

    pub fn join(&mut self, table: &str, on: &str, kind: impl Into<JoinKind>) -> &mut Self {
        let kind = kind.into();
        self.joins.push(ClauseText::new(format!("{} {} ON {}", kind, table, on)));
        self.last_clause = ClauseKind::Joins;
        self
    }

    pub fn r#where(&mut self, condition: impl Into<Condition>) -> &mut Self {
        let condition = condition.into();
        self.where_clause = Some(ClauseText::new(format!("WHERE {} ", condition.to_sql())));
        self.last_clause = ClauseKind::Where;
        self
    }

    pub fn group_by(&mut self, columns: &str) -> &mut Self {
        self.group_by = Some(ClauseText::new(format!("GROUP BY {} ", columns)));
        self.last_clause = ClauseKind::GroupBy;
        self
    }

    pub fn having(&mut self, condition: &str) -> &mut Self {
        self.having = Some(ClauseText::new(format!("HAVING {} ", condition)));
        self.last_clause = ClauseKind::Having;
        self
    }

    pub fn order_by(&mut self, columns: &str) -> &mut Self {
        self.order_by = Some(ClauseText::new(format!("ORDER BY {} ", columns)));
        self.last_clause = ClauseKind::OrderBy;
        self
    }

    /// Sets the LIMIT pair. Does not change the continuation target.
    pub fn limit(&mut self, limit: impl Into<Limit>) -> &mut Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn continue_and(&mut self, fragment: &str) -> &mut Self {
        self.continue_with(Connective::And, fragment)
    }

    pub fn continue_or(&mut self, fragment: &str) -> &mut Self {
        self.continue_with(Connective::Or, fragment)
    }

    pub fn and(&mut self, fragment: &str) -> &mut Self {
        self.continue_and(fragment)
    }

    pub fn or(&mut self, fragment: &str) -> &mut Self {
        self.continue_or(fragment)
    }

    fn continue_with(&mut self, connective: Connective, fragment: &str) -> &mut Self {
        if let Some(clause) = self.clause_mut(self.last_clause) {
            clause.continuations.push((connective, fragment.to_string()));
        }
        self
    }

    /// Storage of the clause named by `kind`. Joins resolve to the most
    /// recently added join.
    fn clause_mut(&mut self, kind: ClauseKind) -> Option<&mut ClauseText> {
        match kind {
            ClauseKind::None => None,
            ClauseKind::From => self.from_clause.as_mut(),
            ClauseKind::Joins => self.joins.last_mut(),
            ClauseKind::Where => self.where_clause.as_mut(),
            ClauseKind::GroupBy => self.group_by.as_mut(),
            ClauseKind::OrderBy => self.order_by.as_mut(),
            ClauseKind::Having => self.having.as_mut(),
        }
    }

    /// Makes `node` the subquery rendered in place of this node's FROM.
    /// A previously attached subquery is replaced.
    pub fn attach_subquery(&mut self, mut node: QueryNode) -> &mut Self {
        node.is_subquery = true;
        node.rebase(self.depth + 1);
        if node.alias.trim().is_empty() {
            let fallback = format!("sq{}", node.depth);
            tracing::warn!(alias = %fallback, "subquery attached without an alias, using fallback");
            node.alias = fallback;
        }
        self.child = Some(Box::new(node));
        self
    }

    fn rebase(&mut self, depth: usize) {
        self.depth = depth;
        if let Some(child) = self.child.as_deref_mut() {
            child.rebase(depth + 1);
        }
    }

    fn tabs(levels: usize) -> String {
        "\t".repeat(levels)
    }

    fn indent(&self) -> String {
        if self.is_subquery {
            format!("{}  ", Self::tabs(self.depth))
        } else {
            String::new()
        }
    }

    pub fn render(&self) -> String {
        let indent = self.indent();
        let mut body = String::new();

        for line in &self.preamble {
            body.push_str(line);
            body.push('\n');
        }
        for line in &self.select_list {
            body.push_str(line);
            body.push('\n');
        }

        match (&self.child, &self.from_clause) {
            (Some(child), _) => body.push_str(&child.render()),
            (None, Some(from)) => from.render_into(&mut body, &indent),
            (None, None) => {}
        }

        for join in &self.joins {
            join.render_into(&mut body, &indent);
        }

        for clause in [&self.where_clause, &self.group_by, &self.having, &self.order_by].into_iter().flatten() {
            clause.render_into(&mut body, &indent);
        }

        if let Some(limit) = &self.limit {
            body.push_str(&format!("{}LIMIT {}, {} \n", indent, limit.offset, limit.count));
        }

        if !self.is_subquery {
            return body;
        }

        let outer = Self::tabs(self.depth.saturating_sub(1));
        let inner = Self::tabs(self.depth);
        format!("{outer}  FROM \n{inner}( {body}{inner}) AS {} \n", self.alias)
    }
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use crate::composer::{ClauseKind, JoinKind, Limit, QueryNode};

    #[test]
    pub fn test_clause_order_is_fixed() {
        let mut node = QueryNode::new();
        node.limit(Limit::default())
            .order_by("a.name")
            .having("COUNT(*) > 1")
            .group_by("a.name")
            .r#where("a.id > 0")
            .join("b", "b.id = a.id", "inner")
            .from("a")
            .select("a.name, COUNT(*)")
            .set_preamble("SET @x = 1");

        let expected = concat!(
            "SET @x = 1 \n",
            "SELECT a.name, COUNT(*) \n",
            "FROM a \n",
            "INNER JOIN b ON b.id = a.id\n",
            "WHERE a.id > 0 \n",
            "GROUP BY a.name \n",
            "HAVING COUNT(*) > 1 \n",
            "ORDER BY a.name \n",
            "LIMIT 0, 100 \n",
        );
        assert_eq!(node.render(), expected);
    }

    #[test]
    pub fn test_join_kinds_render_upper_case() {
        let mut node = QueryNode::new();
        node.join("t", "t.id=x.id", "l")
            .join("t", "t.id=x.id", "left")
            .join("t", "t.id=x.id", "LEFT OUTER")
            .join("t", "t.id=x.id", "bogus")
            .join("t", "t.id=x.id", JoinKind::FullOuter);

        let expected = concat!(
            "LEFT OUTER JOIN t ON t.id=x.id\n",
            "LEFT OUTER JOIN t ON t.id=x.id\n",
            "LEFT OUTER JOIN t ON t.id=x.id\n",
            "INNER JOIN t ON t.id=x.id\n",
            "FULL OUTER JOIN t ON t.id=x.id\n",
        );
        assert_eq!(node.render(), expected);
        assert_eq!(node.join_count(), 5);
    }

    #[test]
    pub fn test_where_list_is_joined_with_and() {
        let mut node = QueryNode::new();
        node.r#where(["a=1", "b=2"]);
        assert_eq!(node.render(), "WHERE a=1 AND b=2 \n");
    }

    #[test]
    pub fn test_where_overwrites() {
        let mut node = QueryNode::new();
        node.r#where("a=1").and("b=2").r#where("c=3");
        assert_eq!(node.render(), "WHERE c=3 \n");
    }

    #[test]
    pub fn test_and_after_where_extends_where() {
        let mut node = QueryNode::new();
        node.join("j", "j.id = t.id", "inner").r#where("a=1").continue_and("c=3");
        assert_eq!(
            node.render(),
            "INNER JOIN j ON j.id = t.id\nWHERE a=1 \nAND c=3\n"
        );
    }

    #[test]
    pub fn test_and_after_join_extends_last_join() {
        let mut node = QueryNode::new();
        node.r#where("a=1")
            .join("j", "j.id = t.id", "inner")
            .join("k", "k.id = t.id", "l")
            .continue_and("c=3")
            .continue_or("d=4");

        let expected = concat!(
            "INNER JOIN j ON j.id = t.id\n",
            "LEFT OUTER JOIN k ON k.id = t.id\n",
            "AND c=3\n",
            "OR d=4\n",
            "WHERE a=1 \n",
        );
        assert_eq!(node.render(), expected);
    }

    #[test]
    pub fn test_continuation_without_clause_is_noop() {
        let mut node = QueryNode::new();
        node.continue_and("x=1").continue_or("y=2").select("*");
        assert_eq!(node.last_clause(), ClauseKind::None);
        assert_eq!(node.render(), "SELECT * \n");
    }

    #[test]
    pub fn test_limit_does_not_move_continuation_target() {
        let mut node = QueryNode::new();
        node.order_by("a").limit(Limit::new(10, 5)).and("b");
        assert_eq!(node.last_clause(), ClauseKind::OrderBy);
        assert_eq!(node.render(), "ORDER BY a \nAND b\nLIMIT 10, 5 \n");
    }

    #[test]
    pub fn test_having_renders_its_own_condition() {
        let mut node = QueryNode::new();
        node.having("SUM(x) > 10").or("COUNT(*) = 0");
        assert_eq!(node.render(), "HAVING SUM(x) > 10 \nOR COUNT(*) = 0\n");
    }

    #[test]
    pub fn test_select_accumulates() {
        let mut node = QueryNode::new();
        node.select("a").select("b");
        assert_eq!(node.render(), "SELECT a \nSELECT b \n");
    }

    #[test]
    pub fn test_empty_subquery_keeps_shell() {
        let mut root = QueryNode::new();
        root.select("*").attach_subquery(QueryNode::subquery("s", 1));

        let expected = concat!(
            "SELECT * \n",
            "  FROM \n",
            "\t( \t) AS s \n",
        );
        assert_eq!(root.render(), expected);
    }

    #[test]
    pub fn test_subquery_replaces_from() {
        let mut sub = QueryNode::subquery("s", 7);
        sub.select("id").from("inner_t").r#where("id > 3").and("id < 9");

        let mut root = QueryNode::new();
        root.select("s.id").from("ignored").attach_subquery(sub);

        let expected = concat!(
            "SELECT s.id \n",
            "  FROM \n",
            "\t( SELECT id \n",
            "\t  FROM inner_t \n",
            "\t  WHERE id > 3 \n",
            "\t  AND id < 9\n",
            "\t) AS s \n",
        );
        assert_eq!(root.render(), expected);
        assert_eq!(root.child().map(|c| c.depth()), Some(1));
    }

    #[test]
    pub fn test_attach_rebases_descendants() {
        let mut inner = QueryNode::new();
        inner.from("leaf");
        let mut middle = QueryNode::subquery("m", 5);
        middle.attach_subquery(inner);

        let mut root = QueryNode::new();
        root.attach_subquery(middle);

        assert_eq!(root.nesting_depth(), 2);
        assert_eq!(root.descendant(1).depth(), 1);
        assert_eq!(root.descendant(2).depth(), 2);
        assert!(root.descendant(2).is_subquery());
        assert_eq!(root.descendant(9).depth(), 2);
    }

    #[test]
    pub fn test_blank_alias_gets_fallback() {
        let mut root = QueryNode::new();
        root.select("*").attach_subquery(QueryNode::new());
        assert_eq!(root.child().map(|c| c.alias()), Some("sq1"));
        assert!(root.render().ends_with("\t) AS sq1 \n"));

        let mut named = QueryNode::new();
        named.attach_subquery(QueryNode::subquery("keep", 4));
        assert_eq!(named.child().map(|c| c.alias()), Some("keep"));
    }

    #[test]
    pub fn test_render_is_repeatable() {
        let mut root = QueryNode::new();
        root.select("*").join("a", "a.x = b.x", "r");
        let mut sub = QueryNode::subquery("b", 1);
        sub.from("t").group_by("x");
        root.attach_subquery(sub);

        let first = root.render();
        assert_eq!(first, root.render());
        assert_eq!(first, root.to_string());
    }

    #[test]
    pub fn test_start_hint_seeds_preamble() {
        let node = QueryNode::with_start("SET @rank = 0");
        assert_eq!(node.render(), "SET @rank = 0 \n");
        assert_eq!(QueryNode::with_start("  ").render(), "");
    }
}
