use crate::instances::InstanceState;
use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

/// Cloud control plane: observe and flip compute instances.
///
/// Calls are independent; a failure for one instance id says nothing about
/// the others.
pub trait CloudControl: Send + Sync {
    fn name(&self) -> &str;

    fn describe_state<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<InstanceState>> + Send + 'a>>;

    fn start<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    fn stop<'a>(
        &'a self,
        instance_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}
