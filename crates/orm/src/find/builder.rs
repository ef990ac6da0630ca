//! Find builder - construction and fluent extension

use trainhub_core::QueryConfig;

use super::types::QueryStructure;
use super::PLACEHOLDER;
use crate::backends::DatabaseValue;
use crate::criteria::{CriteriaParser, ParsedCriteria, QueryParams};
use crate::error::{FindError, FindResult, ParseError};
use crate::metadata::{ModelDefinition, ModelMetadataProvider};

/// List query for one model, built from request parameters
///
/// ```
/// use trainhub_orm::{Find, FieldType, ModelDefinition, QueryParams};
///
/// let training = ModelDefinition::new("training")
///     .field("title", FieldType::String)
///     .association("company", "company");
///
/// let params = QueryParams::new().with("company", "5");
/// let rendered = Find::new("training", &training, &params)?
///     .add_columns("company.name AS companyName")
///     .render();
///
/// assert_eq!(
///     rendered.query,
///     "SELECT training.*, company.name AS companyName FROM training \
///      LEFT JOIN company company ON training.company = company.id \
///      WHERE training.company = $1"
/// );
/// # Ok::<(), trainhub_orm::ParseError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Find {
    pub(crate) model_name: String,
    pub(crate) table: String,
    pub(crate) criteria: ParsedCriteria,
    pub(crate) structure: QueryStructure,
    /// Leading values referenced by the base WHERE fragment
    pub(crate) base_values: usize,
    pub(crate) config: QueryConfig,
    pub(crate) total_only: bool,
}

impl Find {
    /// Parse `params` against `definition` and build the default structure
    pub fn new<S: Into<String>>(
        model_name: S,
        definition: &ModelDefinition,
        params: &QueryParams,
    ) -> Result<Self, ParseError> {
        let model_name = model_name.into();
        let parser = CriteriaParser::new(model_name.as_str(), definition);
        Self::with_parser(&parser, params)
    }

    /// Build from an already configured parser, e.g. one with join aliases
    pub fn with_parser(parser: &CriteriaParser<'_>, params: &QueryParams) -> Result<Self, ParseError> {
        let criteria = parser.parse(params)?;
        let table = parser.table().to_string();

        let structure = QueryStructure::new(
            format!("{}.*", table),
            criteria.joins_sql(&table),
            criteria.query.clone(),
        );

        Ok(Self {
            model_name: parser.model_name().to_string(),
            table,
            base_values: criteria.values.len(),
            criteria,
            structure,
            config: QueryConfig::default(),
            total_only: false,
        })
    }

    /// Look `model_name` up in `provider`, then build as [`Find::new`]
    pub fn from_provider<P>(provider: &P, model_name: &str, params: &QueryParams) -> FindResult<Self>
    where
        P: ModelMetadataProvider + ?Sized,
    {
        let definition = provider
            .fields_of(model_name)
            .ok_or_else(|| FindError::UnknownModel(model_name.to_string()))?;

        Ok(Self::new(model_name, definition, params)?)
    }

    /// Apply limit clamping and defaults from `config`
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    /// Append a column fragment, e.g. `company.name AS companyName`
    pub fn add_columns<S: Into<String>>(mut self, columns: S) -> Self {
        self.structure.additional_columns.push(columns.into());
        self
    }

    /// Append a join fragment
    pub fn add_joins<S: Into<String>>(mut self, joins: S) -> Self {
        self.structure.additional_joins.push(joins.into());
        self
    }

    /// Append a WHERE fragment
    pub fn add_where<S: Into<String>>(mut self, where_clause: S) -> Self {
        self.structure.additional_where.push(where_clause.into());
        self
    }

    /// Replace the base column list; additional columns are kept
    pub fn columns<S: Into<String>>(mut self, columns: S) -> Self {
        self.structure.columns = columns.into();
        self
    }

    /// Replace the base joins; additional joins are kept
    pub fn joins<S: Into<String>>(mut self, joins: S) -> Self {
        self.structure.joins = joins.into();
        self
    }

    /// Replace the base WHERE fragment with one that binds no values
    ///
    /// The values of the replaced fragment are dropped; additional fragments
    /// and values added with [`bind`](Self::bind) are kept.
    pub fn where_clause<S: Into<String>>(self, where_clause: S) -> Self {
        self.where_clause_with(where_clause, Vec::<DatabaseValue>::new())
    }

    /// Replace the base WHERE fragment together with its values
    ///
    /// `where_clause` numbers its placeholders from `$1`. Placeholders of
    /// values added with [`bind`](Self::bind) are shifted to follow them.
    ///
    /// ```
    /// use trainhub_orm::{Find, FieldType, ModelDefinition, QueryParams};
    ///
    /// let training = ModelDefinition::new("training").field("title", FieldType::String);
    /// let params = QueryParams::new().with("title", "Safety");
    ///
    /// let rendered = Find::new("training", &training, &params)?
    ///     .where_clause_with("training.startDate >= $1", ["2024-01-01"])
    ///     .render();
    ///
    /// assert_eq!(rendered.query, "SELECT training.* FROM training WHERE training.startDate >= $1");
    /// assert_eq!(rendered.params.len(), 1);
    /// # Ok::<(), trainhub_orm::ParseError>(())
    /// ```
    pub fn where_clause_with<S, I, V>(mut self, where_clause: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<DatabaseValue>,
    {
        let replaced = self.base_values.min(self.criteria.values.len());
        let bound = self.criteria.values.split_off(replaced);

        self.criteria.values = values.into_iter().map(Into::into).collect();
        let kept = self.criteria.values.len();
        self.criteria.values.extend(bound);

        if kept != replaced {
            let structure = &mut self.structure;
            for fragment in [&mut structure.columns, &mut structure.joins]
                .into_iter()
                .chain(structure.additional_columns.iter_mut())
                .chain(structure.additional_joins.iter_mut())
                .chain(structure.additional_where.iter_mut())
            {
                *fragment = shift_placeholders(fragment, replaced, kept);
            }
        }

        self.base_values = kept;
        self.structure.where_clause = where_clause.into();
        self
    }

    /// Bind one more value, referenced as [`next_placeholder`](Self::next_placeholder)
    /// returned before this call
    pub fn bind<V: Into<DatabaseValue>>(mut self, value: V) -> Self {
        self.criteria.values.push(value.into());
        self
    }

    /// Placeholder the next [`bind`](Self::bind) call will fill, e.g. `$3`
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.criteria.values.len() + 1)
    }

    /// Only count matching rows; the data statement is never run
    pub fn request_total(mut self) -> Self {
        self.total_only = true;
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn criteria(&self) -> &ParsedCriteria {
        &self.criteria
    }

    pub fn structure(&self) -> &QueryStructure {
        &self.structure
    }

    pub fn is_total_only(&self) -> bool {
        self.total_only
    }
}

/// Renumber `$n` for every `n > after` so that `$(after + 1)` becomes `$(to + 1)`
fn shift_placeholders(fragment: &str, after: usize, to: usize) -> String {
    PLACEHOLDER
        .replace_all(fragment, |captures: &regex::Captures<'_>| {
            match captures[1].parse::<usize>() {
                Ok(n) if n > after => format!("${}", n - after + to),
                _ => captures[0].to_string(),
            }
        })
        .into_owned()
}
