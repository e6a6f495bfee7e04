pub mod agreement_reader;
pub mod catalog_repository;
pub mod client;
pub mod inspection_reader;
pub mod production_reader;
pub mod receive_reader;
pub mod rfq_reader;
pub mod shipment_reader;
pub mod transfer_reader;

pub use agreement_reader::PostgresAgreementReader;
pub use catalog_repository::PostgresRiskCatalogRepository;
pub use client::PostgresClient;
pub use inspection_reader::PostgresInspectionReader;
pub use production_reader::PostgresProductionReader;
pub use receive_reader::PostgresReceiveReader;
pub use rfq_reader::PostgresRfqReader;
pub use shipment_reader::PostgresShipmentReader;
pub use transfer_reader::PostgresTransferReader;
