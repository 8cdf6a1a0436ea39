use chrono::{DateTime, Utc};

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
