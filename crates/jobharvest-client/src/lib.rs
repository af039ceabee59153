pub mod export;
pub mod fetcher;
pub mod markup;

pub use export::CsvExporter;
pub use fetcher::ReqwestFetcher;
pub use markup::JobBoardParser;
