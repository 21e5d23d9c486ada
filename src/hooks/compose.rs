//! Startup-time hook composition.
//!
//! Every hook method discovered on the registered providers is folded onto the
//! provider's own before/after hook, in registration order. The result is one
//! callable per phase, built once and handed to the provider.

use std::sync::Arc;

use crate::error::BootstrapError;

use super::types::{
    ComposedHooks, HookConfig, HookContext, HookFn, HookFuture, HookPath, HookPhase, HookProvider,
};

/// Fold `providers` onto `config`.
///
/// - providers present, `config` absent: [`BootstrapError::HooksNotConfigured`]
/// - `config` absent, no providers: `Ok(None)` (nothing to install)
pub fn wire_hooks(
    config: Option<&HookConfig>,
    providers: &[Arc<dyn HookProvider>],
) -> Result<Option<ComposedHooks>, BootstrapError> {
    let Some(config) = config else {
        if providers.is_empty() {
            return Ok(None);
        }
        return Err(BootstrapError::HooksNotConfigured);
    };

    let mut before = config.before.clone();
    let mut after = config.after.clone();

    for provider in providers {
        let provider_name = provider.name();

        for method in Arc::clone(provider).hooks() {
            let filter = match method.path.as_deref() {
                None => None,
                Some(raw) => Some(HookPath::parse(raw).ok_or_else(|| {
                    BootstrapError::InvalidHookPath {
                        provider: provider_name.to_string(),
                        path: raw.to_string(),
                    }
                })?),
            };

            tracing::debug!(
                provider = provider_name,
                method = method.name,
                phase = ?method.phase,
                path = filter.as_ref().map(HookPath::as_str),
                "registering auth hook"
            );

            match method.phase {
                HookPhase::Before => before = Some(chain(before, filter, method.handler)),
                HookPhase::After => after = Some(chain(after, filter, method.handler)),
            }
        }
    }

    Ok(Some(ComposedHooks { before, after }))
}

// previous (if any) always runs; `handler` only when the filter accepts the path
fn chain(previous: Option<HookFn>, filter: Option<HookPath>, handler: HookFn) -> HookFn {
    Arc::new(move |ctx: HookContext| -> HookFuture {
        let previous = previous.clone();
        let filter = filter.clone();
        let handler = Arc::clone(&handler);

        Box::pin(async move {
            if let Some(previous) = previous {
                previous(ctx.clone()).await?;
            }

            if filter.as_ref().is_some_and(|f| !f.matches(&ctx.path)) {
                return Ok(());
            }

            handler(ctx).await
        })
    })
}
