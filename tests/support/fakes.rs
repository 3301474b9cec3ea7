#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use dbot::cloud::CloudControl;
use dbot::config::{Config, InstanceEntry};
use dbot::conversation::{ConversationStore, ConversationTurn};
use dbot::instances::InstanceState;
use dbot::llm::{ChatMessage, CompletionProvider, Role};
use dbot::transport::{Channel, InboundMessage, MessageFormat};

/// Scripted control plane. Each id answers from its queue; the last answer
/// repeats once the queue is down to one entry.
#[derive(Default)]
pub struct FakeCloud {
    script: Mutex<HashMap<String, VecDeque<Result<InstanceState, String>>>>,
    calls: Mutex<Vec<String>>,
    hanging: Mutex<HashSet<String>>,
}

impl FakeCloud {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, id: &str, states: &[&str]) {
        let queue = states.iter().map(|s| Ok(InstanceState::parse(s))).collect();
        self.script.lock().unwrap().insert(id.to_string(), queue);
    }

    pub fn fail(&self, id: &str, message: &str) {
        let queue = VecDeque::from([Err(message.to_string())]);
        self.script.lock().unwrap().insert(id.to_string(), queue);
    }

    /// Make a call such as `"stop i-web"` never complete.
    pub fn hang(&self, call: &str) {
        self.hanging.lock().unwrap().insert(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn record(&self, call: String) {
        let hangs = self.hanging.lock().unwrap().contains(&call);
        self.calls.lock().unwrap().push(call);
        if hangs {
            std::future::pending::<()>().await;
        }
    }

    fn next_state(&self, id: &str) -> anyhow::Result<InstanceState> {
        let mut script = self.script.lock().unwrap();
        let queue = script
            .get_mut(id)
            .ok_or_else(|| anyhow::anyhow!("InvalidInstanceID.NotFound: {id}"))?;
        let answer = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match answer {
            Some(Ok(state)) => Ok(state),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("no scripted state for {id}"),
        }
    }
}

impl CloudControl for FakeCloud {
    fn name(&self) -> &str {
        "fake"
    }

    fn describe_state<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<InstanceState>> + Send + 'a>> {
        Box::pin(async move {
            self.record(format!("describe {instance_id}")).await;
            self.next_state(instance_id)
        })
    }

    fn start<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.record(format!("start {instance_id}")).await;
            Ok(())
        })
    }

    fn stop<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.record(format!("stop {instance_id}")).await;
            Ok(())
        })
    }
}

/// Conversation log that reads from `inner` but refuses every write, like a
/// database that has gone read-only underneath the bot.
pub struct ReadOnlyStore {
    inner: Arc<dyn ConversationStore>,
}

impl ReadOnlyStore {
    pub fn wrap(inner: Arc<dyn ConversationStore>) -> Arc<Self> {
        Arc::new(Self { inner })
    }
}

impl ConversationStore for ReadOnlyStore {
    fn append<'a>(
        &'a self,
        _role: Role,
        _content: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<ConversationTurn>> + Send + 'a>> {
        Box::pin(async { anyhow::bail!("attempt to write a readonly database") })
    }

    fn append_exchange<'a>(
        &'a self,
        _user: &'a str,
        _assistant: &'a str,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async { anyhow::bail!("attempt to write a readonly database") })
    }

    fn tail<'a>(
        &'a self,
        n: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<Vec<ConversationTurn>>> + Send + 'a>> {
        self.inner.tail(n)
    }

    fn trim<'a>(
        &'a self,
        keep_last: usize,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>> {
        self.inner.trim(keep_last)
    }

    fn count<'a>(&'a self) -> Pin<Box<dyn Future<Output = anyhow::Result<u64>> + Send + 'a>> {
        self.inner.count()
    }
}

/// Completion provider that records every prompt it receives.
pub struct FakeProvider {
    replies: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn reply(&self, text: &str) {
        self.replies.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn fail_next(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionProvider for FakeProvider {
    fn name(&self) -> &str {
        "fake"
    }

    fn complete<'a>(
        &'a self,
        _model: &'a str,
        messages: &'a [ChatMessage],
        _temperature: f64,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.prompts.lock().unwrap().push(messages.to_vec());
            match self.replies.lock().unwrap().pop_front() {
                Some(Ok(reply)) => Ok(reply),
                Some(Err(message)) => Err(anyhow::anyhow!(message)),
                None => Ok("ok".to_string()),
            }
        })
    }
}

/// Channel that keeps everything it was asked to send.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<(String, MessageFormat)>>,
    failing: Mutex<bool>,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent(&self) -> Vec<(String, MessageFormat)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        message: &'a str,
        format: MessageFormat,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(async move {
            if *self.failing.lock().unwrap() {
                anyhow::bail!("network unreachable");
            }
            self.sent.lock().unwrap().push((message.to_string(), format));
            Ok(())
        })
    }

    fn listen<'a>(
        &'a self,
        _tx: tokio::sync::mpsc::Sender<InboundMessage>,
    ) -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>> {
        Box::pin(std::future::pending())
    }
}

pub fn config_with(instances: &[(&str, Option<&str>)]) -> Config {
    let mut config = Config::default();
    config.telegram.bot_token = "123:ABC".into();
    config.telegram.recipient_id = 7;
    config.ec2.region = "us-east-1".into();
    config.ec2.soft_check_threshold = 2;
    config.chat.api_key = "sk-test".into();
    config.chat.system_prompt = "You are terse.".into();
    config.chat.context = 4;
    config.ec2.instances = instances
        .iter()
        .map(|(name, id)| InstanceEntry::new(*name, *id))
        .collect();
    config
}
