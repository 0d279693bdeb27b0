/// Client-side session handling
///
/// Server-issued access tokens are short-lived; this module keeps client
/// sessions alive across expiry without duplicating refresh work or
/// losing in-flight requests.

mod coordinator;
mod tokens;
mod transport;

pub use coordinator::AuthClient;
pub use coordinator::ClientError;
pub use tokens::TokenStore;
pub use transport::ApiFailure;
pub use transport::ApiRequest;
pub use transport::AuthTransport;
pub use transport::HttpTransport;
