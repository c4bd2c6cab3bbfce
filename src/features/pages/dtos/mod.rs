pub mod bootstrap_dto;

pub use bootstrap_dto::{ClientBootstrapDto, GeolocationMessagesDto, MessageCatalogDto};
