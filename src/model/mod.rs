mod post;
mod request;
mod response;
mod trace;

pub use post::{LocalizedText, POSTS_COLLECTION, Post};
pub(crate) use post::title_to_bson;
pub use request::{CreatePostRequest, UpdatePostRequest};
pub use response::{
    PostIdResponse, PostListResponse, PostResponse, PostSummary, PostVersionResponse,
    TraceListResponse, TraceResponse, TraceSummary,
};
pub use trace::{TRACES_COLLECTION, Trace};
