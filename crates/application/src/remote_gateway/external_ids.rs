use std::collections::BTreeMap;

use odoolink_core::{AppError, AppResult};
use odoolink_domain::{EntityType, ExternalId, RemoteOperation, SearchDomain};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::{GatewayRequest, RemoteGateway, SearchOptions, decode};

const EXTERNAL_ID_ENTITY: &str = "ir.model.data";

#[derive(Debug, Deserialize)]
struct ExternalIdRow {
    module: String,
    name: String,
    #[serde(default)]
    res_id: Option<i64>,
}

impl ExternalIdRow {
    fn external_id(&self) -> AppResult<ExternalId> {
        ExternalId::new(self.module.as_str(), self.name.as_str())
    }
}

fn external_id_entity() -> AppResult<EntityType> {
    EntityType::new(EXTERNAL_ID_ENTITY)
}

fn reference_request(external_id: &ExternalId) -> AppResult<GatewayRequest> {
    Ok(
        GatewayRequest::new(external_id_entity()?, RemoteOperation::GetObjectReference)
            .with_args(vec![json!(external_id.module()), json!(external_id.name())]),
    )
}

/// Extracts the id from a `[model, id]` reference pair.
fn referenced_id(value: Value) -> AppResult<i64> {
    let (_, id): (Value, i64) = decode(RemoteOperation::GetObjectReference, value)?;
    Ok(id)
}

impl RemoteGateway {
    /// Resolves an external id to a database id, raising when unknown.
    pub async fn id_from_external_id(&self, external_id: &ExternalId) -> AppResult<i64> {
        let value = self.call(reference_request(external_id)?).await?;
        let id = referenced_id(value)?;
        debug!(external_id = %external_id, id, "resolved external id");

        Ok(id)
    }

    /// Resolves an external id without raising.
    ///
    /// `None` covers both an unknown reference and a failed call.
    pub async fn find_id_from_external_id(&self, external_id: &ExternalId) -> Option<i64> {
        let request = reference_request(external_id).ok()?;
        let value = self.call_no_raise(request).await?;

        referenced_id(value).ok()
    }

    /// Returns the external id attached to one record.
    pub async fn external_id_from_id(
        &self,
        entity_type: &EntityType,
        id: i64,
    ) -> AppResult<ExternalId> {
        let domain = SearchDomain::all()
            .filter("model", "=", entity_type.as_str())
            .filter("res_id", "=", id);
        let options = SearchOptions {
            fields: vec!["module".to_owned(), "name".to_owned()],
            order: Some("id".to_owned()),
            ..SearchOptions::default()
        };

        let rows = self
            .search_read(&external_id_entity()?, &domain, &options, None)
            .await?;
        let Some(row) = rows.into_iter().next() else {
            return Err(AppError::NotFound(format!(
                "no external id for '{entity_type}' record {id}"
            )));
        };

        decode::<ExternalIdRow>(RemoteOperation::SearchRead, Value::Object(row))?.external_id()
    }

    /// Maps every record id of `entity_type` to its external id.
    pub async fn external_ids_by_id(
        &self,
        entity_type: &EntityType,
    ) -> AppResult<BTreeMap<i64, ExternalId>> {
        let mut mapping = BTreeMap::new();
        for row in self.external_id_rows(entity_type).await? {
            if let Some(res_id) = row.res_id {
                mapping.insert(res_id, row.external_id()?);
            }
        }

        Ok(mapping)
    }

    /// Maps every external id of `entity_type` to its record id.
    pub async fn ids_by_external_id(
        &self,
        entity_type: &EntityType,
    ) -> AppResult<BTreeMap<ExternalId, i64>> {
        let mut mapping = BTreeMap::new();
        for row in self.external_id_rows(entity_type).await? {
            if let Some(res_id) = row.res_id {
                mapping.insert(row.external_id()?, res_id);
            }
        }

        Ok(mapping)
    }

    async fn external_id_rows(&self, entity_type: &EntityType) -> AppResult<Vec<ExternalIdRow>> {
        let domain = SearchDomain::all().filter("model", "=", entity_type.as_str());
        let options = SearchOptions {
            fields: vec!["module".to_owned(), "name".to_owned(), "res_id".to_owned()],
            ..SearchOptions::default()
        };

        let rows = self
            .search_read(&external_id_entity()?, &domain, &options, None)
            .await?;

        rows.into_iter()
            .map(|row| decode(RemoteOperation::SearchRead, Value::Object(row)))
            .collect()
    }
}
