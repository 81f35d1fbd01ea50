//! Collaborator contracts consumed by the execution context.
//!
//! The dispatch loop, the bot's API wrappers, job scheduling and persistence
//! backends all live outside this crate. The context only needs the narrow
//! views defined here.

use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::foundation::Update;
use crate::framework::callback_data::CallbackDataCache;
use crate::framework::store::SharedData;

/// Channel into the dispatcher's update queue.
pub type UpdateQueue = mpsc::UnboundedSender<Update>;

/// The bot capabilities the context relies on.
pub trait Bot: Send + Sync + 'static {
    /// Returns `true` if inline keyboards carry arbitrary callback data.
    fn arbitrary_callback_data(&self) -> bool {
        false
    }

    /// Returns the callback data cache, when arbitrary callback data is enabled.
    fn callback_data_cache(&self) -> Option<&CallbackDataCache> {
        None
    }
}

/// A scheduled job. Scheduling itself is handled elsewhere.
pub trait Job: Debug + Send + Sync + 'static {
    /// Returns the job's name.
    fn name(&self) -> &str;
}

/// The job queue attached to a dispatcher.
pub trait JobQueue: Send + Sync + 'static {
    /// Returns the jobs currently scheduled.
    fn jobs(&self) -> Vec<Arc<dyn Job>>;

    /// Returns the scheduled jobs with the given name.
    fn get_jobs_by_name(&self, name: &str) -> Vec<Arc<dyn Job>> {
        self.jobs()
            .into_iter()
            .filter(|job| job.name() == name)
            .collect()
    }
}

/// Which data kinds a persistence backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceInput {
    pub bot_data: bool,
    pub chat_data: bool,
    pub user_data: bool,
}

impl Default for PersistenceInput {
    fn default() -> Self {
        Self {
            bot_data: true,
            chat_data: true,
            user_data: true,
        }
    }
}

/// A persistence backend that can refresh in-memory data from storage.
pub trait Persistence<UD, CD, BD>: Send + Sync {
    /// Returns which data kinds this backend stores.
    fn store_data(&self) -> PersistenceInput;

    /// Refreshes the global data in place.
    fn refresh_bot_data(&self, bot_data: &SharedData<BD>);

    /// Refreshes one chat's data in place.
    fn refresh_chat_data(&self, chat_id: i64, chat_data: &SharedData<CD>);

    /// Refreshes one user's data in place.
    fn refresh_user_data(&self, user_id: i64, user_data: &SharedData<UD>);
}

/// The dispatcher as seen from a context.
///
/// `chat_data` and `user_data` return the dispatcher's own entry for the id,
/// creating it first if needed. The context never creates or removes entries
/// on its own.
pub trait Dispatcher<B: Bot + ?Sized, UD, CD, BD>: Send + Sync {
    /// The bot this dispatcher serves.
    fn bot(&self) -> &Arc<B>;

    /// The job queue, if one is attached.
    fn job_queue(&self) -> Option<&Arc<dyn JobQueue>>;

    /// The queue new updates are pushed into.
    fn update_queue(&self) -> &UpdateQueue;

    /// The persistence backend, if one is configured.
    fn persistence(&self) -> Option<&dyn Persistence<UD, CD, BD>>;

    /// The global data entry.
    fn bot_data(&self) -> &SharedData<BD>;

    /// The entry for `chat_id`.
    fn chat_data(&self, chat_id: i64) -> SharedData<CD>;

    /// The entry for `user_id`.
    fn user_data(&self, user_id: i64) -> SharedData<UD>;
}
