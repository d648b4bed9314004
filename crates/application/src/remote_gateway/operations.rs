use odoolink_core::{AppError, AppResult};
use odoolink_domain::{
    CallContext, DomainTerm, EntityType, ExternalId, LoadKeySet, LoadResult, Record,
    RemoteOperation, SearchDomain,
};
use serde_json::{Map, Value, json};

use super::{GatewayRequest, RemoteGateway, decode};

const ATTACHMENT_ENTITY: &str = "ir.attachment";
const COUNTRY_ENTITY: &str = "res.country";
const WEBSITE_MENU_ENTITY: &str = "website.menu";

/// Paging and projection for `search`/`search_read`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    /// Fields to return; empty means every field.
    pub fields: Vec<String>,
    /// Sort order such as `name asc, id desc`.
    pub order: Option<String>,
    /// Number of matches to skip.
    pub offset: u32,
    /// Maximum number of matches; `None` returns all.
    pub limit: Option<u32>,
}

/// Paging and grouping behaviour for `read_group`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadGroupOptions {
    /// Number of groups to skip.
    pub offset: u32,
    /// Maximum number of groups.
    pub limit: Option<u32>,
    /// Sort order for groups.
    pub orderby: Option<String>,
    /// Group by the first field only and return sub-group domains.
    pub lazy: bool,
}

impl Default for ReadGroupOptions {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: None,
            orderby: None,
            lazy: true,
        }
    }
}

fn order_value(order: Option<&str>) -> Value {
    order.map_or(Value::String(String::new()), Value::from)
}

impl RemoteGateway {
    /// Returns matching records with the requested fields.
    pub async fn search_read(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        options: &SearchOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::SearchRead)
            .with_args(vec![
                domain.to_value(),
                json!(options.fields),
                json!(options.offset),
                json!(options.limit.unwrap_or(0)),
                order_value(options.order.as_deref()),
            ])
            .with_context(context);

        decode(RemoteOperation::SearchRead, self.call(request).await?)
    }

    /// Returns matching ids.
    pub async fn search_ids(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        options: &SearchOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<i64>> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::Search)
            .with_args(vec![
                domain.to_value(),
                json!(options.offset),
                json!(options.limit.unwrap_or(0)),
                order_value(options.order.as_deref()),
            ])
            .with_context(context);

        decode(RemoteOperation::Search, self.call(request).await?)
    }

    /// Returns the number of matching records.
    pub async fn search_count(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<u64> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::SearchCount)
            .with_args(vec![domain.to_value()])
            .with_context(context);

        decode(RemoteOperation::SearchCount, self.call(request).await?)
    }

    /// Returns the first id matching `domain` ordered by id.
    pub async fn search_first_id(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<i64> {
        let options = SearchOptions {
            order: Some("id".to_owned()),
            limit: Some(1),
            ..SearchOptions::default()
        };

        self.search_ids(entity_type, domain, &options, context)
            .await?
            .first()
            .copied()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no '{entity_type}' record matches {}",
                    domain.to_value()
                ))
            })
    }

    /// Returns one record by id with every field.
    pub async fn find_record(
        &self,
        entity_type: &EntityType,
        id: i64,
        context: Option<&CallContext>,
    ) -> AppResult<Option<Record>> {
        let domain = SearchDomain::all().filter("id", "=", id);
        let records = self
            .search_read(entity_type, &domain, &SearchOptions::default(), context)
            .await?;

        Ok(records.into_iter().next())
    }

    /// Reads fields of known ids.
    pub async fn read(
        &self,
        entity_type: &EntityType,
        ids: &[i64],
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::Read)
            .with_args(vec![json!(ids), json!(fields)])
            .with_context(context);

        decode(RemoteOperation::Read, self.call(request).await?)
    }

    /// Aggregates matching records grouped by `groupby`.
    pub async fn read_group(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        fields: &[String],
        groupby: &[String],
        options: &ReadGroupOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::ReadGroup)
            .with_args(vec![
                domain.to_value(),
                json!(fields),
                json!(groupby),
                json!(options.offset),
                json!(options.limit),
                options
                    .orderby
                    .as_deref()
                    .map_or(Value::Bool(false), Value::from),
                json!(options.lazy),
            ])
            .with_context(context);

        decode(RemoteOperation::ReadGroup, self.call(request).await?)
    }

    /// Updates known ids with the same values.
    pub async fn write(
        &self,
        entity_type: &EntityType,
        ids: &[i64],
        values: &Record,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::Write)
            .with_args(vec![json!(ids), Value::Object(values.clone())])
            .with_context(context);

        decode(RemoteOperation::Write, self.call(request).await?)
    }

    /// Creates one record and returns its id.
    pub async fn create(
        &self,
        entity_type: &EntityType,
        values: &Record,
        context: Option<&CallContext>,
    ) -> AppResult<i64> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::Create)
            .with_args(vec![Value::Object(values.clone())])
            .with_context(context);

        match self.call(request).await? {
            Value::Array(ids) => ids.first().and_then(Value::as_i64).ok_or_else(|| {
                AppError::Protocol("create returned an empty id list".to_owned())
            }),
            value => decode(RemoteOperation::Create, value),
        }
    }

    /// Creates several records in one call and returns their ids in order.
    pub async fn create_many(
        &self,
        entity_type: &EntityType,
        values: &[Record],
        context: Option<&CallContext>,
    ) -> AppResult<Vec<i64>> {
        let rows = values.iter().cloned().map(Value::Object).collect();
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::Create)
            .with_args(vec![Value::Array(rows)])
            .with_context(context);

        match self.call(request).await? {
            Value::Number(id) => id.as_i64().map(|id| vec![id]).ok_or_else(|| {
                AppError::Protocol(format!("create returned a non-integer id '{id}'"))
            }),
            value => decode(RemoteOperation::Create, value),
        }
    }

    /// Deletes known ids.
    pub async fn unlink(
        &self,
        entity_type: &EntityType,
        ids: &[i64],
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::Unlink)
            .with_args(vec![json!(ids)])
            .with_context(context);

        decode(RemoteOperation::Unlink, self.call(request).await?)
    }

    /// Deletes every record matching `domain`.
    pub async fn unlink_domain(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        let ids = self
            .search_ids(entity_type, domain, &SearchOptions::default(), context)
            .await?;

        self.unlink(entity_type, &ids, context).await
    }

    /// Sets the `active` flag on every record matching `domain`.
    pub async fn set_active(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        is_active: bool,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        let ids = self
            .search_ids(entity_type, domain, &SearchOptions::default(), context)
            .await?;
        let mut values = Record::new();
        values.insert("active".to_owned(), Value::Bool(is_active));

        self.write(entity_type, &ids, &values, context).await
    }

    /// Sets the `active` flag on records whose leading condition matches the
    /// record behind `external_id`.
    ///
    /// Only the field and operator of the first condition of `domain` are
    /// kept; its value is replaced by the resolved id.
    pub async fn set_active_by_external_id(
        &self,
        entity_type: &EntityType,
        domain: &SearchDomain,
        external_id: &ExternalId,
        is_active: bool,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        let Some(DomainTerm::Condition {
            field, operator, ..
        }) = domain.terms().first()
        else {
            return Err(AppError::Validation(
                "domain must start with a condition to match an external id".to_owned(),
            ));
        };

        let id = self.id_from_external_id(external_id).await?;
        let resolved = SearchDomain::all().filter(field.as_str(), operator.as_str(), id);

        self.set_active(entity_type, &resolved, is_active, context)
            .await
    }

    /// Submits one load call with positional rows aligned to `key_set`.
    pub async fn load(
        &self,
        entity_type: &EntityType,
        key_set: &LoadKeySet,
        rows: &[Vec<Value>],
        context: Option<&CallContext>,
    ) -> AppResult<LoadResult> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::Load)
            .with_args(vec![json!(key_set.fields()), json!(rows)])
            .with_context(context);

        decode(RemoteOperation::Load, self.call(request).await?)
    }

    /// Returns default values for `fields`.
    pub async fn default_get(
        &self,
        entity_type: &EntityType,
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Record> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::DefaultGet)
            .with_args(vec![json!(fields)])
            .with_context(context);

        decode(RemoteOperation::DefaultGet, self.call(request).await?)
    }

    /// Describes fields: label, help text and type, keyed by field name.
    ///
    /// An empty `fields` slice describes every field.
    pub async fn fields_get(
        &self,
        entity_type: &EntityType,
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Map<String, Value>> {
        let request = GatewayRequest::new(entity_type.clone(), RemoteOperation::FieldsGet)
            .with_kwarg("allfields", json!(fields))
            .with_kwarg("attributes", json!(["string", "help", "type"]))
            .with_context(context);

        decode(RemoteOperation::FieldsGet, self.call(request).await?)
    }

    /// Stores an attachment linked to `res_entity` and returns its id.
    ///
    /// `datas` must already be base64 encoded when the content is binary.
    pub async fn create_attachment(
        &self,
        name: &str,
        datas: &str,
        res_entity: &EntityType,
        res_id: Option<i64>,
        context: Option<&CallContext>,
    ) -> AppResult<i64> {
        let mut values = Record::new();
        values.insert("name".to_owned(), Value::from(name));
        values.insert("datas".to_owned(), Value::from(datas));
        values.insert("res_model".to_owned(), Value::from(res_entity.as_str()));
        if let Some(res_id) = res_id {
            values.insert("res_id".to_owned(), Value::from(res_id));
        }

        let attachment_entity = EntityType::new(ATTACHMENT_ENTITY)?;
        self.create(&attachment_entity, &values, context).await
    }

    /// Returns the id of the country with ISO `code`.
    pub async fn country_id(&self, code: &str) -> AppResult<i64> {
        let domain = SearchDomain::all().filter("code", "=", code);

        self.search_first_id(&EntityType::new(COUNTRY_ENTITY)?, &domain, None)
            .await
    }

    /// Returns the id of the menu entry pointing at `url` on one website.
    pub async fn website_menu_id(&self, website_id: i64, url: &str) -> AppResult<i64> {
        let domain = SearchDomain::all()
            .filter("website_id", "=", website_id)
            .filter("url", "=", url);

        self.search_first_id(&EntityType::new(WEBSITE_MENU_ENTITY)?, &domain, None)
            .await
    }
}
