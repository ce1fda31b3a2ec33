use std::fmt;

use serde_json::Value;

use crate::{
    composer::{Condition, JoinKind, Limit, QueryNode},
    database::{ComposerConfig, Connection, Detached, FetchMode, Quote},
    params::{substitute, SubstitutionObserver},
    ComposerResult, ParamMap,
};

/// Fluent facade over a tree of [`QueryNode`]s.
///
/// Clause calls go to the active node. `open_subquery` nests a new node
/// under the active one and activates it; `close_subquery` returns to the
/// parent. Each node holds a single subquery slot, so the active node is
/// always `active_depth` levels below the root.
///
/// ```
/// use sqlnest::QueryComposer;
///
/// let mut query = QueryComposer::detached();
/// query.select("t.id").from("things t").r#where("t.id > 3").and("t.id < 9");
/// assert_eq!(query.render(), "SELECT t.id \nFROM things t \nWHERE t.id > 3 \nAND t.id < 9\n");
/// ```
pub struct QueryComposer<C = Detached> {
    connection: C,
    root: QueryNode,
    active_depth: usize,
    subquery_count: usize,
    statements: Vec<String>,
    config: ComposerConfig,
    observer: Option<SubstitutionObserver>,
}

impl QueryComposer<Detached> {
    /// A composer without a database, for rendering only.
    pub fn detached() -> Self {
        Self::create(Detached)
    }
}

impl<C> QueryComposer<C> {
    pub fn create(connection: C) -> Self {
        Self::with_config(connection, ComposerConfig::default())
    }

    /// Seeds the root preamble with `start`.
    pub fn with_start(connection: C, start: &str) -> Self {
        let mut composer = Self::create(connection);
        composer.root = QueryNode::with_start(start);
        composer
    }

    pub fn with_config(connection: C, config: ComposerConfig) -> Self {
        Self {
            connection,
            root: QueryNode::new(),
            active_depth: 0,
            subquery_count: 0,
            statements: vec![],
            config,
            observer: None,
        }
    }

    pub fn config(&self) -> &ComposerConfig { &self.config }
    pub fn connection(&self) -> &C { &self.connection }
    pub fn connection_mut(&mut self) -> &mut C { &mut self.connection }
    pub fn root(&self) -> &QueryNode { &self.root }
    pub fn active_depth(&self) -> usize { self.active_depth }
    pub fn subquery_count(&self) -> usize { self.subquery_count }

    pub fn into_connection(self) -> C {
        self.connection
    }

    pub fn active(&self) -> &QueryNode {
        self.root.descendant(self.active_depth)
    }

    pub fn active_mut(&mut self) -> &mut QueryNode {
        self.root.descendant_mut(self.active_depth)
    }

    /// Installs a callback notified of every placeholder substitution made
    /// by `render_text`.
    pub fn set_observer(&mut self, observer: SubstitutionObserver) -> &mut Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_preamble(&mut self, text: &str) -> &mut Self {
        self.active_mut().set_preamble(text);
        self
    }

    pub fn select(&mut self, columns: &str) -> &mut Self {
        self.active_mut().select(columns);
        self
    }

    pub fn from(&mut self, table: &str) -> &mut Self {
        self.active_mut().from(table);
        self
    }

    pub fn join(&mut self, table: &str, on: &str, kind: impl Into<JoinKind>) -> &mut Self {
        self.active_mut().join(table, on, kind);
        self
    }

    pub fn inner_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(table, on, JoinKind::Inner)
    }

    pub fn r#where(&mut self, condition: impl Into<Condition>) -> &mut Self {
        self.active_mut().r#where(condition);
        self
    }

    pub fn group_by(&mut self, columns: &str) -> &mut Self {
        self.active_mut().group_by(columns);
        self
    }

    pub fn having(&mut self, condition: &str) -> &mut Self {
        self.active_mut().having(condition);
        self
    }

    pub fn order_by(&mut self, columns: &str) -> &mut Self {
        self.active_mut().order_by(columns);
        self
    }

    pub fn limit(&mut self, limit: impl Into<Limit>) -> &mut Self {
        self.active_mut().limit(limit);
        self
    }

    pub fn continue_and(&mut self, fragment: &str) -> &mut Self {
        self.active_mut().continue_and(fragment);
        self
    }

    pub fn continue_or(&mut self, fragment: &str) -> &mut Self {
        self.active_mut().continue_or(fragment);
        self
    }

    pub fn and(&mut self, fragment: &str) -> &mut Self {
        self.continue_and(fragment)
    }

    pub fn or(&mut self, fragment: &str) -> &mut Self {
        self.continue_or(fragment)
    }

    pub fn open_subquery(&mut self, alias: &str) -> &mut Self {
        self.open_subquery_with(alias, "")
    }

    /// Nests a subquery aliased `alias` in the active node's FROM and makes
    /// it active. `start` seeds the subquery's preamble.
    pub fn open_subquery_with(&mut self, alias: &str, start: &str) -> &mut Self {
        self.subquery_count += 1;
        let depth = self.active_depth + 1;
        let node = QueryNode::subquery_with_start(alias, depth, start);

        let active = self.active_mut();
        if active.has_subquery() {
            let replaced = active.child().map(|c| c.alias().to_string()).unwrap_or_default();
            tracing::warn!(alias, replaced = %replaced, "subquery slot already used, replacing");
        }
        active.attach_subquery(node);

        self.active_depth = depth;
        tracing::trace!(alias, depth, "subquery opened");
        self
    }

    /// Makes the parent of the active node active again. No-op at the root.
    pub fn close_subquery(&mut self) -> &mut Self {
        if self.active_depth == 0 {
            tracing::trace!("close_subquery at root ignored");
            return self;
        }

        self.active_depth -= 1;
        tracing::trace!(depth = self.active_depth, "subquery closed");
        self
    }

    /// Queues a raw statement (e.g. `SET @rank := 0`) run by `execute`
    /// before the query itself.
    pub fn register_statement(&mut self, statement: &str) -> &mut Self {
        self.statements.push(statement.to_string());
        self
    }

    pub fn registered_statements(&self) -> &[String] {
        &self.statements
    }

    /// The full statement text, without placeholder substitution.
    pub fn render(&self) -> String {
        self.root.render()
    }
}

impl<C: Quote> QueryComposer<C> {
    /// Renders the statement and, when `params` is given, replaces the
    /// first occurrence of each placeholder with its quoted literal.
    pub fn render_text(&self, params: Option<&ParamMap>) -> ComposerResult<String> {
        let sql = self.root.render();
        match params {
            Some(params) => substitute(
                &sql,
                params,
                self.config.placeholder_sigil,
                &self.connection,
                self.observer.as_ref(),
            ),
            None => Ok(sql),
        }
    }
}

impl<C: Connection> QueryComposer<C> {
    pub fn execute(&mut self, params: &ParamMap) -> ComposerResult<Vec<Value>> {
        let mode = self.config.default_fetch_mode;
        self.execute_with(params, mode)
    }

    /// Runs registered statements, then prepares and executes the rendered
    /// query with `params` bound by the connection.
    pub fn execute_with(&mut self, params: &ParamMap, mode: FetchMode) -> ComposerResult<Vec<Value>> {
        for statement in &self.statements {
            let raw = format!("{}{}", statement, self.config.statement_terminator);
            self.connection.exec(&raw)?;
        }

        let sql = self.root.render();
        tracing::debug!(sql = %sql, params = params.len(), "executing composed query");

        let mut prepared = self.connection.prepare(&sql)?;
        self.connection.execute(&mut prepared, params)?;
        self.connection.fetch(&mut prepared, mode)
    }
}

impl<C> fmt::Display for QueryComposer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl<C: fmt::Debug> fmt::Debug for QueryComposer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryComposer")
            .field("connection", &self.connection)
            .field("root", &self.root)
            .field("active_depth", &self.active_depth)
            .field("subquery_count", &self.subquery_count)
            .field("statements", &self.statements)
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}
