mod request;
mod response;

pub use request::{DescribeRequest, IndexRequest, QueryRequest};
pub use response::{HealthResponse, IndexResponse, QueryResponse};
