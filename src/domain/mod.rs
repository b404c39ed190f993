pub mod catalog;
pub mod filters;
pub mod intent;
pub mod request;

pub use catalog::{Catalog, CatalogError, CatalogMessage, CatalogResponse};
pub use filters::{FieldClause, Filter, FilterType, FilterValue};
pub use intent::{
    Category, City, Context, Country, Descriptor, Fulfillment, Intent, Item, Location, Message,
    Price, Provider, State,
};
pub use request::{
    GeoPoint, GeoSpatial, LogicalOperator, Page, RequestEnvelope, SearchParams, SearchRequest,
};
