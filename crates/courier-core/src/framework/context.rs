//! The per-event execution context.
//!
//! The dispatcher creates one [`CallbackContext`] per incoming update, job run
//! or error, and hands the same instance to every handler it invokes for that
//! event, across all handler groups. Handlers use it to reach:
//!
//! - the **keyed data** of the event's chat and user, plus the global data;
//! - the **event details** filled in by handlers along the way (`args`,
//!   `matches`, the captured `error`, the originating `job`);
//! - an open **extension map** for passing values between handler groups.
//!
//! # Data views
//!
//! [`bot_data`](CallbackContext::bot_data), [`chat_data`](CallbackContext::chat_data)
//! and [`user_data`](CallbackContext::user_data) return the dispatcher's own
//! [`SharedData`] entries. Mutating them through the lock is visible to every
//! later context for the same chat or user. They cannot be replaced: the
//! generic attribute writers reject these names with
//! [`ContextError::ImmutableAttribute`].
//!
//! # Example
//!
//! ```rust,ignore
//! async fn count(ctx: &mut DefaultContext) -> anyhow::Result<()> {
//!     if let Some(chat) = ctx.chat_data() {
//!         let mut chat = chat.write();
//!         let n = chat.get("count").and_then(|v| v.as_i64()).unwrap_or(0);
//!         chat.insert("count".into(), (n + 1).into());
//!     }
//!     ctx.insert("seen", true)?;
//!     Ok(())
//! }
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use regex::{Captures, Regex};
use tracing::trace;

use crate::foundation::{CallbackQuery, ContextError, ContextResult, Update};
use crate::framework::dispatcher::{Bot, Dispatcher, Job, JobQueue, UpdateQueue};
use crate::framework::store::{DataMap, SharedData};

/// A dynamically typed attribute value.
pub type ContextValue = Arc<dyn Any + Send + Sync>;

/// Context with the default data shapes and a type-erased bot.
pub type DefaultContext = CallbackContext<dyn Bot, DataMap, DataMap, DataMap>;

/// Attribute names that can only be read.
pub const READ_ONLY_ATTRIBUTES: &[&str] = &[
    "dispatcher",
    "bot",
    "job_queue",
    "update_queue",
    "bot_data",
    "chat_data",
    "user_data",
    "match",
];

// =============================================================================
// PatternMatch
// =============================================================================

/// An owned snapshot of one regex match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    start: usize,
    end: usize,
    groups: Vec<Option<String>>,
    named: HashMap<String, String>,
}

impl PatternMatch {
    /// Captures the first match of `regex` in `haystack`.
    pub fn search(regex: &Regex, haystack: &str) -> Option<Self> {
        regex
            .captures(haystack)
            .map(|caps| Self::from_captures(regex, &caps))
    }

    /// Builds a snapshot from capture groups produced by `regex`.
    pub fn from_captures(regex: &Regex, caps: &Captures<'_>) -> Self {
        let whole = caps.get(0);
        let groups = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        let named = regex
            .capture_names()
            .flatten()
            .filter_map(|name| Some((name.to_string(), caps.name(name)?.as_str().to_string())))
            .collect();

        Self {
            start: whole.map_or(0, |m| m.start()),
            end: whole.map_or(0, |m| m.end()),
            groups,
            named,
        }
    }

    /// The whole matched text.
    pub fn as_str(&self) -> &str {
        self.group(0).unwrap_or_default()
    }

    /// Byte offset where the match starts.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset where the match ends.
    pub fn end(&self) -> usize {
        self.end
    }

    /// Returns group `index`; group 0 is the whole match.
    pub fn group(&self, index: usize) -> Option<&str> {
        self.groups.get(index)?.as_deref()
    }

    /// Returns a named group.
    pub fn name(&self, name: &str) -> Option<&str> {
        self.named.get(name).map(String::as_str)
    }
}

// =============================================================================
// CallbackContext
// =============================================================================

/// The context object passed to handlers, job callbacks and error handlers.
///
/// Generic over the bot type and the three data shapes. Most code uses
/// [`DefaultContext`].
pub struct CallbackContext<B: Bot + ?Sized = dyn Bot, UD = DataMap, CD = DataMap, BD = DataMap> {
    dispatcher: Arc<dyn Dispatcher<B, UD, CD, BD>>,
    chat: Option<(i64, SharedData<CD>)>,
    user: Option<(i64, SharedData<UD>)>,
    args: Option<Vec<String>>,
    matches: Option<Vec<PatternMatch>>,
    error: Option<Arc<anyhow::Error>>,
    job: Option<Arc<dyn Job>>,
    async_args: Option<Vec<ContextValue>>,
    async_kwargs: Option<HashMap<String, ContextValue>>,
    extra: HashMap<String, ContextValue>,
}

/// A validated attribute write, applied only once a whole batch is accepted.
enum Assignment {
    Args(Option<Vec<String>>),
    Matches(Option<Vec<PatternMatch>>),
    Error(Option<Arc<anyhow::Error>>),
    Job(Option<Arc<dyn Job>>),
    AsyncArgs(Option<Vec<ContextValue>>),
    AsyncKwargs(Option<HashMap<String, ContextValue>>),
    Extra(String, ContextValue),
}

/// Accepts either `T` or `Option<T>` for a fixed field.
fn downcast_field<T: Clone + 'static>(
    name: &str,
    value: &ContextValue,
) -> ContextResult<Option<T>> {
    if let Some(v) = value.downcast_ref::<T>() {
        return Ok(Some(v.clone()));
    }
    if let Some(v) = value.downcast_ref::<Option<T>>() {
        return Ok(v.clone());
    }
    Err(ContextError::AttributeType {
        name: name.to_string(),
        expected: std::any::type_name::<T>(),
    })
}

impl<B: Bot + ?Sized, UD, CD, BD> CallbackContext<B, UD, CD, BD> {
    /// Creates an unbound context: no chat, no user, no event details.
    pub fn new(dispatcher: Arc<dyn Dispatcher<B, UD, CD, BD>>) -> Self {
        Self {
            dispatcher,
            chat: None,
            user: None,
            args: None,
            matches: None,
            error: None,
            job: None,
            async_args: None,
            async_kwargs: None,
            extra: HashMap::new(),
        }
    }

    /// Creates the context for an update.
    ///
    /// The chat and user bindings are resolved through the dispatcher's
    /// stores using the update's effective chat and user. Passing `None`
    /// yields an unbound context.
    pub fn from_update(
        update: Option<&Update>,
        dispatcher: Arc<dyn Dispatcher<B, UD, CD, BD>>,
    ) -> Self {
        let mut ctx = Self::new(dispatcher);

        if let Some(update) = update {
            if let Some(chat) = update.effective_chat() {
                ctx.chat = Some((chat.id, ctx.dispatcher.chat_data(chat.id)));
            }
            if let Some(user) = update.effective_user() {
                ctx.user = Some((user.id, ctx.dispatcher.user_data(user.id)));
            }
            trace!(
                update_id = update.update_id,
                chat_id = ?ctx.chat_id(),
                user_id = ?ctx.user_id(),
                "Context bound to update"
            );
        }

        ctx
    }

    /// Creates the context for a job callback. No chat or user is bound.
    pub fn from_job(job: Arc<dyn Job>, dispatcher: Arc<dyn Dispatcher<B, UD, CD, BD>>) -> Self {
        let mut ctx = Self::new(dispatcher);
        ctx.job = Some(job);
        ctx
    }

    /// Creates the context for an error handler.
    ///
    /// `async_args` and `async_kwargs` are the arguments of the deferred call
    /// that failed, when the error came from work run in the background.
    pub fn from_error(
        update: Option<&Update>,
        error: impl Into<anyhow::Error>,
        dispatcher: Arc<dyn Dispatcher<B, UD, CD, BD>>,
        async_args: Option<Vec<ContextValue>>,
        async_kwargs: Option<HashMap<String, ContextValue>>,
        job: Option<Arc<dyn Job>>,
    ) -> Self {
        let mut ctx = Self::from_update(update, dispatcher);
        ctx.error = Some(Arc::new(error.into()));
        ctx.async_args = async_args;
        ctx.async_kwargs = async_kwargs;
        ctx.job = job;
        ctx
    }

    // ─── Forwarding accessors ─────────────────────────────────────────────────

    /// The dispatcher that created this context.
    pub fn dispatcher(&self) -> &Arc<dyn Dispatcher<B, UD, CD, BD>> {
        &self.dispatcher
    }

    /// The bot serving this event.
    pub fn bot(&self) -> &Arc<B> {
        self.dispatcher.bot()
    }

    /// The dispatcher's job queue, if any.
    pub fn job_queue(&self) -> Option<&Arc<dyn JobQueue>> {
        self.dispatcher.job_queue()
    }

    /// The dispatcher's update queue.
    pub fn update_queue(&self) -> &UpdateQueue {
        self.dispatcher.update_queue()
    }

    // ─── Data views ───────────────────────────────────────────────────────────

    /// Data shared by every event.
    pub fn bot_data(&self) -> &SharedData<BD> {
        self.dispatcher.bot_data()
    }

    /// Data of the event's chat, if the event has one.
    pub fn chat_data(&self) -> Option<&SharedData<CD>> {
        self.chat.as_ref().map(|(_, data)| data)
    }

    /// Data of the event's user, if the event has one.
    pub fn user_data(&self) -> Option<&SharedData<UD>> {
        self.user.as_ref().map(|(_, data)| data)
    }

    /// Id of the bound chat.
    pub fn chat_id(&self) -> Option<i64> {
        self.chat.as_ref().map(|(id, _)| *id)
    }

    /// Id of the bound user.
    pub fn user_id(&self) -> Option<i64> {
        self.user.as_ref().map(|(id, _)| *id)
    }

    // ─── Event details ────────────────────────────────────────────────────────

    /// Command arguments, set by command-style handlers.
    pub fn args(&self) -> Option<&[String]> {
        self.args.as_deref()
    }

    /// Pattern matches, set by pattern-filter handlers.
    pub fn matches(&self) -> Option<&[PatternMatch]> {
        self.matches.as_deref()
    }

    /// The first pattern match, or `None` when there are no matches.
    pub fn first_match(&self) -> Option<&PatternMatch> {
        self.matches.as_ref()?.first()
    }

    /// The error being handled, in error-handler contexts.
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_deref()
    }

    /// The job that triggered this context.
    pub fn job(&self) -> Option<&Arc<dyn Job>> {
        self.job.as_ref()
    }

    /// Positional arguments of the failed deferred call.
    pub fn async_args(&self) -> Option<&[ContextValue]> {
        self.async_args.as_deref()
    }

    /// Keyword arguments of the failed deferred call.
    pub fn async_kwargs(&self) -> Option<&HashMap<String, ContextValue>> {
        self.async_kwargs.as_ref()
    }

    /// Sets the command arguments.
    pub fn set_args(&mut self, args: Vec<String>) {
        self.args = Some(args);
    }

    /// Sets the pattern matches.
    pub fn set_matches(&mut self, matches: Vec<PatternMatch>) {
        self.matches = Some(matches);
    }

    // ─── Extension map ────────────────────────────────────────────────────────

    /// Reads an extension value of type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.extra.get(key)?.downcast_ref::<T>()
    }

    /// Returns `true` if an extension value exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.extra.contains_key(key)
    }

    /// Removes an extension value.
    pub fn remove(&mut self, key: &str) -> Option<ContextValue> {
        self.extra.remove(key)
    }

    /// Writes one attribute, typed. See [`set_attribute`](Self::set_attribute).
    pub fn insert<T: Any + Send + Sync>(&mut self, key: &str, value: T) -> ContextResult<()> {
        self.set_attribute(key, Arc::new(value))
    }

    /// Writes one attribute by name.
    ///
    /// Fixed fields (`args`, `matches`, `error`, `job`, `async_args`,
    /// `async_kwargs`) are overwritten when `value` holds the field's type or
    /// an `Option` of it. Read-only names fail with
    /// [`ContextError::ImmutableAttribute`]. Any other name goes to the
    /// extension map.
    pub fn set_attribute(&mut self, key: &str, value: ContextValue) -> ContextResult<()> {
        let assignment = Self::prepare(key, value)?;
        self.apply(assignment);
        Ok(())
    }

    /// Writes every entry of `data`, with the rules of
    /// [`set_attribute`](Self::set_attribute).
    ///
    /// All entries are validated first; if any is rejected nothing is written.
    pub fn update<I, K>(&mut self, data: I) -> ContextResult<()>
    where
        I: IntoIterator<Item = (K, ContextValue)>,
        K: AsRef<str>,
    {
        let assignments = data
            .into_iter()
            .map(|(key, value)| Self::prepare(key.as_ref(), value))
            .collect::<ContextResult<Vec<_>>>()?;

        for assignment in assignments {
            self.apply(assignment);
        }
        Ok(())
    }

    fn prepare(key: &str, value: ContextValue) -> ContextResult<Assignment> {
        if READ_ONLY_ATTRIBUTES.contains(&key) {
            return Err(ContextError::immutable(key));
        }

        Ok(match key {
            "args" => Assignment::Args(downcast_field(key, &value)?),
            "matches" => Assignment::Matches(downcast_field(key, &value)?),
            "error" => Assignment::Error(downcast_field(key, &value)?),
            "job" => Assignment::Job(downcast_field(key, &value)?),
            "async_args" => Assignment::AsyncArgs(downcast_field(key, &value)?),
            "async_kwargs" => Assignment::AsyncKwargs(downcast_field(key, &value)?),
            _ => Assignment::Extra(key.to_string(), value),
        })
    }

    fn apply(&mut self, assignment: Assignment) {
        match assignment {
            Assignment::Args(v) => self.args = v,
            Assignment::Matches(v) => self.matches = v,
            Assignment::Error(v) => self.error = v,
            Assignment::Job(v) => self.job = v,
            Assignment::AsyncArgs(v) => self.async_args = v,
            Assignment::AsyncKwargs(v) => self.async_kwargs = v,
            Assignment::Extra(key, value) => {
                self.extra.insert(key, value);
            }
        }
    }

    // ─── Operations ───────────────────────────────────────────────────────────

    /// Asks the persistence backend to refresh the data this context sees.
    ///
    /// Global data is refreshed when the backend stores it; chat and user
    /// data only when the backend stores that kind and the context is bound
    /// to a chat or user. Does nothing without persistence.
    pub fn refresh_data(&self) {
        let Some(persistence) = self.dispatcher.persistence() else {
            return;
        };
        let store = persistence.store_data();

        if store.bot_data {
            persistence.refresh_bot_data(self.bot_data());
        }
        if store.chat_data
            && let Some((chat_id, data)) = &self.chat
        {
            persistence.refresh_chat_data(*chat_id, data);
        }
        if store.user_data
            && let Some((user_id, data)) = &self.user
        {
            persistence.refresh_user_data(*user_id, data);
        }
    }

    /// Drops the cached callback data of `callback_query`.
    ///
    /// Fails with [`ContextError::CallbackDataDisabled`] if the bot does not
    /// use arbitrary callback data, and with
    /// [`CallbackDataError::QueryNotFound`](crate::CallbackDataError::QueryNotFound)
    /// if the query is unknown to the cache.
    pub fn drop_callback_data(&self, callback_query: &CallbackQuery) -> ContextResult<()> {
        let bot = self.bot();
        if !bot.arbitrary_callback_data() {
            return Err(ContextError::CallbackDataDisabled);
        }
        let cache = bot
            .callback_data_cache()
            .ok_or(ContextError::CallbackDataDisabled)?;
        cache.drop_data(callback_query)?;
        Ok(())
    }
}

impl<B: Bot + ?Sized, UD, CD, BD> std::fmt::Debug for CallbackContext<B, UD, CD, BD> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackContext")
            .field("chat_id", &self.chat_id())
            .field("user_id", &self.user_id())
            .field("args", &self.args)
            .field("matches", &self.matches)
            .field("error", &self.error)
            .field("job", &self.job)
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
