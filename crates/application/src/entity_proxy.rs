use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};

use async_trait::async_trait;
use odoolink_core::AppResult;
use odoolink_domain::{
    CallContext, EntityType, ExternalId, LoadKeySet, LoadResult, Record, SearchDomain,
};
use serde_json::{Map, Value};

use crate::bulk_load_service::{BulkLoadOptions, BulkLoadOrchestrator, BulkLoadReport};
use crate::remote_gateway::{ReadGroupOptions, RemoteGateway, SearchOptions};

/// Every remote operation available on a single entity type.
#[async_trait]
pub trait EntityOperations: Send + Sync {
    /// Returns the bound entity type.
    fn entity_type(&self) -> &EntityType;

    /// Returns matching records with the requested fields.
    async fn search_read(
        &self,
        domain: &SearchDomain,
        options: &SearchOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>>;

    /// Returns matching ids.
    async fn search_ids(
        &self,
        domain: &SearchDomain,
        options: &SearchOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<i64>>;

    /// Returns the number of matching records.
    async fn search_count(
        &self,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<u64>;

    /// Returns the first id matching `domain`.
    async fn search_first_id(
        &self,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<i64>;

    /// Returns one record by id.
    async fn find_record(
        &self,
        id: i64,
        context: Option<&CallContext>,
    ) -> AppResult<Option<Record>>;

    /// Reads fields of known ids.
    async fn read(
        &self,
        ids: &[i64],
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>>;

    /// Aggregates matching records.
    async fn read_group(
        &self,
        domain: &SearchDomain,
        fields: &[String],
        groupby: &[String],
        options: &ReadGroupOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>>;

    /// Updates known ids.
    async fn write(
        &self,
        ids: &[i64],
        values: &Record,
        context: Option<&CallContext>,
    ) -> AppResult<bool>;

    /// Creates one record.
    async fn create(&self, values: &Record, context: Option<&CallContext>) -> AppResult<i64>;

    /// Creates several records.
    async fn create_many(
        &self,
        values: &[Record],
        context: Option<&CallContext>,
    ) -> AppResult<Vec<i64>>;

    /// Deletes known ids.
    async fn unlink(&self, ids: &[i64], context: Option<&CallContext>) -> AppResult<bool>;

    /// Deletes every record matching `domain`.
    async fn unlink_domain(
        &self,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<bool>;

    /// Sets the `active` flag on every record matching `domain`.
    async fn set_active(
        &self,
        domain: &SearchDomain,
        is_active: bool,
        context: Option<&CallContext>,
    ) -> AppResult<bool>;

    /// Sets the `active` flag on records whose leading condition of
    /// `domain` matches the record behind `external_id`.
    async fn set_active_by_external_id(
        &self,
        domain: &SearchDomain,
        external_id: &ExternalId,
        is_active: bool,
        context: Option<&CallContext>,
    ) -> AppResult<bool>;

    /// Submits one load call.
    async fn load(
        &self,
        key_set: &LoadKeySet,
        rows: &[Vec<Value>],
        context: Option<&CallContext>,
    ) -> AppResult<LoadResult>;

    /// Loads records in sequential fixed-size batches.
    async fn bulk_load(
        &self,
        records: &[Record],
        options: &BulkLoadOptions,
    ) -> AppResult<BulkLoadReport>;

    /// Returns default values for `fields`.
    async fn default_get(
        &self,
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Record>;

    /// Describes fields of the entity type.
    async fn fields_get(
        &self,
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Map<String, Value>>;

    /// Stores an attachment linked to this entity type.
    async fn create_attachment(
        &self,
        name: &str,
        datas: &str,
        res_id: Option<i64>,
        context: Option<&CallContext>,
    ) -> AppResult<i64>;

    /// Returns the external id of one record.
    async fn external_id_from_id(&self, id: i64) -> AppResult<ExternalId>;

    /// Maps record ids to external ids.
    async fn external_ids_by_id(&self) -> AppResult<BTreeMap<i64, ExternalId>>;

    /// Maps external ids to record ids.
    async fn ids_by_external_id(&self) -> AppResult<BTreeMap<ExternalId, i64>>;
}

/// Gateway facade with the entity type fixed.
///
/// Two proxies are interchangeable when their entity types are equal.
#[derive(Clone)]
pub struct EntityProxy {
    entity_type: EntityType,
    gateway: RemoteGateway,
}

impl EntityProxy {
    /// Binds a gateway to an entity type.
    #[must_use]
    pub fn new(entity_type: EntityType, gateway: RemoteGateway) -> Self {
        Self {
            entity_type,
            gateway,
        }
    }
}

impl PartialEq for EntityProxy {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type
    }
}

impl Eq for EntityProxy {}

impl Debug for EntityProxy {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("EntityProxy")
            .field("entity_type", &self.entity_type)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EntityOperations for EntityProxy {
    fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    async fn search_read(
        &self,
        domain: &SearchDomain,
        options: &SearchOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>> {
        self.gateway
            .search_read(&self.entity_type, domain, options, context)
            .await
    }

    async fn search_ids(
        &self,
        domain: &SearchDomain,
        options: &SearchOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<i64>> {
        self.gateway
            .search_ids(&self.entity_type, domain, options, context)
            .await
    }

    async fn search_count(
        &self,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<u64> {
        self.gateway
            .search_count(&self.entity_type, domain, context)
            .await
    }

    async fn search_first_id(
        &self,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<i64> {
        self.gateway
            .search_first_id(&self.entity_type, domain, context)
            .await
    }

    async fn find_record(
        &self,
        id: i64,
        context: Option<&CallContext>,
    ) -> AppResult<Option<Record>> {
        self.gateway
            .find_record(&self.entity_type, id, context)
            .await
    }

    async fn read(
        &self,
        ids: &[i64],
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>> {
        self.gateway
            .read(&self.entity_type, ids, fields, context)
            .await
    }

    async fn read_group(
        &self,
        domain: &SearchDomain,
        fields: &[String],
        groupby: &[String],
        options: &ReadGroupOptions,
        context: Option<&CallContext>,
    ) -> AppResult<Vec<Record>> {
        self.gateway
            .read_group(&self.entity_type, domain, fields, groupby, options, context)
            .await
    }

    async fn write(
        &self,
        ids: &[i64],
        values: &Record,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        self.gateway
            .write(&self.entity_type, ids, values, context)
            .await
    }

    async fn create(&self, values: &Record, context: Option<&CallContext>) -> AppResult<i64> {
        self.gateway
            .create(&self.entity_type, values, context)
            .await
    }

    async fn create_many(
        &self,
        values: &[Record],
        context: Option<&CallContext>,
    ) -> AppResult<Vec<i64>> {
        self.gateway
            .create_many(&self.entity_type, values, context)
            .await
    }

    async fn unlink(&self, ids: &[i64], context: Option<&CallContext>) -> AppResult<bool> {
        self.gateway.unlink(&self.entity_type, ids, context).await
    }

    async fn unlink_domain(
        &self,
        domain: &SearchDomain,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        self.gateway
            .unlink_domain(&self.entity_type, domain, context)
            .await
    }

    async fn set_active(
        &self,
        domain: &SearchDomain,
        is_active: bool,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        self.gateway
            .set_active(&self.entity_type, domain, is_active, context)
            .await
    }

    async fn set_active_by_external_id(
        &self,
        domain: &SearchDomain,
        external_id: &ExternalId,
        is_active: bool,
        context: Option<&CallContext>,
    ) -> AppResult<bool> {
        self.gateway
            .set_active_by_external_id(&self.entity_type, domain, external_id, is_active, context)
            .await
    }

    async fn load(
        &self,
        key_set: &LoadKeySet,
        rows: &[Vec<Value>],
        context: Option<&CallContext>,
    ) -> AppResult<LoadResult> {
        self.gateway
            .load(&self.entity_type, key_set, rows, context)
            .await
    }

    async fn bulk_load(
        &self,
        records: &[Record],
        options: &BulkLoadOptions,
    ) -> AppResult<BulkLoadReport> {
        BulkLoadOrchestrator::new(self.gateway.clone())
            .bulk_load(&self.entity_type, records, options)
            .await
    }

    async fn default_get(
        &self,
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Record> {
        self.gateway
            .default_get(&self.entity_type, fields, context)
            .await
    }

    async fn fields_get(
        &self,
        fields: &[String],
        context: Option<&CallContext>,
    ) -> AppResult<Map<String, Value>> {
        self.gateway
            .fields_get(&self.entity_type, fields, context)
            .await
    }

    async fn create_attachment(
        &self,
        name: &str,
        datas: &str,
        res_id: Option<i64>,
        context: Option<&CallContext>,
    ) -> AppResult<i64> {
        self.gateway
            .create_attachment(name, datas, &self.entity_type, res_id, context)
            .await
    }

    async fn external_id_from_id(&self, id: i64) -> AppResult<ExternalId> {
        self.gateway
            .external_id_from_id(&self.entity_type, id)
            .await
    }

    async fn external_ids_by_id(&self) -> AppResult<BTreeMap<i64, ExternalId>> {
        self.gateway.external_ids_by_id(&self.entity_type).await
    }

    async fn ids_by_external_id(&self) -> AppResult<BTreeMap<ExternalId, i64>> {
        self.gateway.ids_by_external_id(&self.entity_type).await
    }
}

#[cfg(test)]
mod tests {
    use odoolink_domain::{ExternalId, SearchDomain};
    use serde_json::json;

    use crate::test_support::{ScriptedTransport, entity, gateway_over};

    use super::EntityOperations;

    #[test]
    fn proxies_compare_by_entity_type() {
        let gateway = gateway_over(ScriptedTransport::new(Vec::new()));
        let other_gateway = gateway_over(ScriptedTransport::new(Vec::new()));

        assert_eq!(
            gateway.entity(entity("res.partner")),
            other_gateway.entity(entity("res.partner"))
        );
        assert_ne!(
            gateway.entity(entity("res.partner")),
            gateway.entity(entity("res.country"))
        );
    }

    #[tokio::test]
    async fn proxy_forwards_with_fixed_entity_type() {
        let transport = ScriptedTransport::new(vec![Ok(json!(12)), Ok(json!([5, 6]))]);
        let partners = gateway_over(transport.clone()).entity(entity("res.partner"));

        let count = partners
            .search_count(&SearchDomain::all().filter("is_company", "=", true), None)
            .await;
        let ids = partners
            .search_ids(&SearchDomain::all(), &Default::default(), None)
            .await;

        assert!(matches!(count, Ok(12)));
        assert!(matches!(ids, Ok(ref ids) if ids == &vec![5, 6]));
        let calls = transport.calls().await;
        assert!(
            calls
                .iter()
                .all(|call| call.entity_type.as_str() == "res.partner")
        );
        assert_eq!(partners.entity_type().as_str(), "res.partner");
    }

    #[tokio::test]
    async fn unlink_domain_searches_then_deletes() {
        let transport = ScriptedTransport::new(vec![Ok(json!([3, 4])), Ok(json!(true))]);
        let partners = gateway_over(transport.clone()).entity(entity("res.partner"));

        let result = partners
            .unlink_domain(&SearchDomain::all().filter("name", "ilike", "test"), None)
            .await;

        assert!(matches!(result, Ok(true)));
        let calls = transport.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].operation.as_str(), "search");
        assert_eq!(calls[1].operation.as_str(), "unlink");
        assert_eq!(calls[1].args, vec![json!([3, 4])]);
    }

    #[tokio::test]
    async fn set_active_writes_flag_on_matching_ids() {
        let transport = ScriptedTransport::new(vec![Ok(json!([8])), Ok(json!(true))]);
        let menus = gateway_over(transport.clone()).entity(entity("website.menu"));

        let result = menus
            .set_active(&SearchDomain::all().filter("url", "=", "/shop"), false, None)
            .await;

        assert!(matches!(result, Ok(true)));
        let calls = transport.calls().await;
        assert_eq!(calls[1].args, vec![json!([8]), json!({"active": false})]);
    }

    #[tokio::test]
    async fn set_active_by_external_id_keeps_entity_type() {
        let transport = ScriptedTransport::new(vec![
            Ok(json!(["res.country", 75])),
            Ok(json!([3])),
            Ok(json!(true)),
        ]);
        let partners = gateway_over(transport.clone()).entity(entity("res.partner"));
        let country = ExternalId::parse("base.fr")
            .unwrap_or_else(|error| panic!("valid external id expected: {error}"));

        let result = partners
            .set_active_by_external_id(
                &SearchDomain::all().filter("country_id", "=", false),
                &country,
                true,
                None,
            )
            .await;

        assert!(matches!(result, Ok(true)));
        let calls = transport.calls().await;
        assert_eq!(calls[1].entity_type.as_str(), "res.partner");
        assert_eq!(calls[1].args[0], json!([["country_id", "=", 75]]));
        assert_eq!(calls[2].entity_type.as_str(), "res.partner");
    }
}
