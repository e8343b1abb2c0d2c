pub mod clients;
pub mod config;
pub mod domain {
    pub mod notice;
    pub mod pay_request;
    pub mod task;
    pub mod transaction;
}
pub mod error;
pub mod http {
    pub mod envelope;
    pub mod handlers {
        pub mod notices;
        pub mod ops;
        pub mod tasks;
    }
    pub mod middleware {
        pub mod admin_auth;
    }
    pub mod routes;
}
pub mod repo {
    pub mod notice_repo;
    pub mod task_queue_repo;
}
pub mod service {
    pub mod notice_sender;
    pub mod notify_service;
    pub mod pay_service;
    pub mod task_retry;
    pub mod task_worker;
}
pub mod signing;

use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub notice_store: Arc<dyn repo::notice_repo::NoticeStore>,
    pub task_queue: Arc<dyn repo::task_queue_repo::TaskQueue>,
}
