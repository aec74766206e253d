//! The lease client: token resolution, number acquisition, SMS polling,
//! release and ignore.

use crate::clock::{Clock, TokioClock};
use crate::config::ClientConfig;
use crate::errors::{Result, SmsLeaseError};
use crate::progress::{NoopProgress, ProgressObserver};
use crate::response::ApiResponse;
use crate::transport::{Action, HttpTransport, Transport, TransportError};
use crate::types::{AccountInfo, Mobile, SmsCode, SmsOutcome};
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "tracing")]
use opentelemetry::trace::Status;
#[cfg(feature = "tracing")]
use tracing::{Span, debug, info, warn};
#[cfg(feature = "tracing")]
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// First maximal run of digits in an SMS body.
static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new("[0-9]+").expect("invalid digit regex"));

/// Client for the number-rental service.
///
/// Owns the session state: the cached auth token and the currently held
/// lease (at most one per client). Operations take `&mut self`, so one
/// client cannot be driven from two places at once; run concurrent leases
/// on separate clients.
///
/// Construction never touches the network. The token is resolved on the
/// first call that needs it, or explicitly via [`resolve_token`].
///
/// # Example
///
/// ```rust,ignore
/// use sms_lease::{ClientConfig, SmsLeaseClient, SmsOutcome};
///
/// let config = ClientConfig::builder()
///     .username("user")
///     .password("pass")
///     .item_id(1042)
///     .build();
/// let mut client = SmsLeaseClient::from_config(config)?;
///
/// let mobile = client.acquire_number(None, None).await?;
/// println!("leased {}", mobile.with_country_prefix());
///
/// let code = client.numeric_code(None, None).await?;
/// println!("got code {}", code);
/// ```
///
/// [`resolve_token`]: SmsLeaseClient::resolve_token
pub struct SmsLeaseClient<T: Transport = HttpTransport> {
    transport: T,
    config: ClientConfig,
    token: Option<SecretString>,
    lease: Option<Mobile>,
    observer: Arc<dyn ProgressObserver>,
    clock: Arc<dyn Clock>,
}

impl<T: Transport> std::fmt::Debug for SmsLeaseClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmsLeaseClient")
            .field("endpoint", &self.config.endpoint)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("lease", &self.lease)
            .finish()
    }
}

impl SmsLeaseClient<HttpTransport> {
    /// Create a client with an HTTP transport built from the configuration.
    pub fn from_config(config: ClientConfig) -> std::result::Result<Self, TransportError> {
        let transport = HttpTransport::from_config(&config)?;
        Ok(Self::new(transport, config))
    }
}

impl<T: Transport> SmsLeaseClient<T> {
    /// Create a client over a custom transport.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        let token = config.token.clone();
        Self {
            transport,
            config,
            token,
            lease: None,
            observer: Arc::new(NoopProgress),
            clock: Arc::new(TokioClock),
        }
    }

    /// Attach a progress observer.
    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Replace the clock used by the polling loop.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Get a reference to the resolved configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The currently held number, if any.
    pub fn leased(&self) -> Option<&Mobile> {
        self.lease.as_ref()
    }

    /// The held number formatted with the `+86` country prefix.
    pub fn mobile(&self) -> Result<String> {
        self.lease
            .as_ref()
            .map(Mobile::with_country_prefix)
            .ok_or(SmsLeaseError::NoLease)
    }

    /// Resolve the auth token.
    ///
    /// No-op when a token is already cached (configured or previously
    /// resolved). Otherwise performs a login call with the configured
    /// username and password.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_lease.resolve_token", skip_all)
    )]
    pub async fn resolve_token(&mut self) -> Result<()> {
        if self.token.is_some() {
            return Ok(());
        }

        let (username, password) = match (&self.config.username, &self.config.password) {
            (Some(username), Some(password)) => {
                (username.clone(), password.expose_secret().to_string())
            }
            _ => return Err(SmsLeaseError::Configuration),
        };

        let text = self
            .transport
            .call(
                Action::Login,
                vec![("username", username), ("password", password)],
            )
            .await?;

        match ApiResponse::from_text(&text) {
            ApiResponse::Success(token) => {
                self.token = Some(SecretString::from(token));
                self.observer.token_acquired();

                #[cfg(feature = "tracing")]
                info!("auth token acquired");

                Ok(())
            }
            ApiResponse::Error(error) => Err(SmsLeaseError::Authentication(error)),
        }
    }

    /// Drop the cached token so the next call resolves a fresh one.
    pub fn reset_token(&mut self) {
        self.token = None;
    }

    /// Resolve the token if needed and return it for a request.
    async fn token(&mut self) -> Result<String> {
        self.resolve_token().await?;
        match &self.token {
            Some(token) => Ok(token.expose_secret().to_string()),
            None => Err(SmsLeaseError::Configuration),
        }
    }

    /// Effective `itemid` parameter: explicit argument, else configured
    /// default, else empty (the service tolerates an empty itemid).
    fn item_param(&self, item_id: Option<u32>) -> String {
        item_id
            .or(self.config.item_id)
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Effective mobile for operations that default to the held lease.
    fn effective_mobile(&self, mobile: Option<Mobile>) -> Result<Mobile> {
        mobile
            .or_else(|| self.lease.clone())
            .ok_or(SmsLeaseError::NoLease)
    }

    /// Fetch the account balance/status/level/max-hold snapshot.
    ///
    /// Callable at any time; does not touch the lease state.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_lease.account_info", skip_all)
    )]
    pub async fn account_info(&mut self) -> Result<AccountInfo> {
        let token = self.token().await?;

        let text = self
            .transport
            .call(
                Action::GetAccountInfo,
                vec![("token", token), ("format", "1".to_string())],
            )
            .await?;

        let payload = ApiResponse::from_text(&text).into_result()?;
        let info: AccountInfo = serde_json::from_str(&payload)?;

        #[cfg(feature = "tracing")]
        debug!(balance = info.balance, status = info.status, "account info fetched");

        self.observer.account_fetched(&info);
        Ok(info)
    }

    /// Lease a number from the pool.
    ///
    /// `item_id` and `exclude` default to the configured values. On success
    /// the number becomes the held lease.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "sms_lease.acquire_number",
            skip_all,
            fields(mobile = tracing::field::Empty)
        )
    )]
    pub async fn acquire_number(
        &mut self,
        item_id: Option<u32>,
        exclude: Option<Vec<String>>,
    ) -> Result<Mobile> {
        let token = self.token().await?;
        let itemid = self.item_param(item_id);
        let excludeno = exclude
            .map(|list| list.join(","))
            .unwrap_or_else(|| self.config.exclude.join(","));

        let text = self
            .transport
            .call(
                Action::GetMobile,
                vec![
                    ("token", token),
                    ("itemid", itemid),
                    ("excludeno", excludeno),
                ],
            )
            .await?;

        let payload = ApiResponse::from_text(&text).into_result()?;
        let mobile = Mobile::new(payload);
        self.lease = Some(mobile.clone());
        self.observer.number_acquired(&mobile);

        #[cfg(feature = "tracing")]
        {
            Span::current().record("mobile", mobile.as_str());
            Span::current().set_status(Status::Ok);
            info!(mobile = %mobile, "number leased");
        }

        Ok(mobile)
    }

    /// Return the number to the pool.
    ///
    /// Returns `Ok(true)` and clears the lease on success. When the
    /// provider declines (for instance a number it considers already
    /// released) this resolves to `Ok(false)` without raising; transport
    /// failures still propagate.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_lease.release", skip_all)
    )]
    pub async fn release(&mut self, mobile: Option<Mobile>, item_id: Option<u32>) -> Result<bool> {
        self.finish(Action::Release, mobile, item_id).await
    }

    /// Blacklist the number and return it to the pool.
    ///
    /// Same success and soft-failure semantics as [`release`].
    ///
    /// [`release`]: SmsLeaseClient::release
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_lease.ignore", skip_all)
    )]
    pub async fn ignore(&mut self, mobile: Option<Mobile>, item_id: Option<u32>) -> Result<bool> {
        self.finish(Action::AddIgnore, mobile, item_id).await
    }

    /// Shared implementation of `release` and `ignore`.
    async fn finish(
        &mut self,
        action: Action,
        mobile: Option<Mobile>,
        item_id: Option<u32>,
    ) -> Result<bool> {
        let mobile = self.effective_mobile(mobile)?;
        let token = self.token().await?;
        let itemid = self.item_param(item_id);

        let text = self
            .transport
            .call(
                action,
                vec![
                    ("token", token),
                    ("itemid", itemid),
                    ("mobile", mobile.as_str().to_string()),
                    ("release", "1".to_string()),
                ],
            )
            .await?;

        let ok = match ApiResponse::from_text(&text) {
            ApiResponse::Success(_) => {
                self.lease = None;
                true
            }
            ApiResponse::Error(_error) => {
                #[cfg(feature = "tracing")]
                warn!(mobile = %mobile, code = %_error.code, "provider declined {action}");
                false
            }
        };

        match action {
            Action::AddIgnore => self.observer.ignored(&mobile, ok),
            _ => self.observer.released(&mobile, ok),
        }
        Ok(ok)
    }

    /// Poll for the inbound SMS until it arrives, a fatal error occurs, or
    /// the maximum wait elapses.
    ///
    /// Code 3001 ("SMS not yet received") is the only status that keeps the
    /// loop going; every other non-success code aborts immediately with an
    /// [`Api`] error, even ones that might look transient. On timeout the
    /// held number is released and [`SmsOutcome::TimedOut`] is returned; a
    /// timeout is a designed recovery path, not an error.
    ///
    /// [`Api`]: SmsLeaseError::Api
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_lease.await_sms", skip_all)
    )]
    pub async fn await_sms(
        &mut self,
        mobile: Option<Mobile>,
        item_id: Option<u32>,
    ) -> Result<SmsOutcome> {
        self.await_sms_inner(mobile, item_id, None).await
    }

    /// Like [`await_sms`], but also stops when `cancel` fires.
    ///
    /// The token is checked once per iteration, so cancellation latency is
    /// bounded by the poll interval. Cancellation does not release the
    /// number; the caller decides whether to [`release`] or [`ignore`].
    ///
    /// [`await_sms`]: SmsLeaseClient::await_sms
    /// [`release`]: SmsLeaseClient::release
    /// [`ignore`]: SmsLeaseClient::ignore
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_lease.await_sms_cancellable", skip_all)
    )]
    pub async fn await_sms_cancellable(
        &mut self,
        mobile: Option<Mobile>,
        item_id: Option<u32>,
        cancel: CancellationToken,
    ) -> Result<SmsOutcome> {
        self.await_sms_inner(mobile, item_id, Some(cancel)).await
    }

    async fn await_sms_inner(
        &mut self,
        mobile: Option<Mobile>,
        item_id: Option<u32>,
        cancel: Option<CancellationToken>,
    ) -> Result<SmsOutcome> {
        let mobile = self.effective_mobile(mobile)?;
        let token = self.token().await?;
        let itemid = self.item_param(item_id);
        let interval = self.config.poll_interval;
        let max_wait = self.config.max_wait;
        let started = self.clock.now();
        let mut polls: u32 = 0;

        #[cfg(feature = "tracing")]
        debug!(
            mobile = %mobile,
            max_wait_secs = max_wait.as_secs_f64(),
            "waiting for SMS"
        );

        loop {
            if let Some(cancel) = &cancel
                && cancel.is_cancelled()
            {
                let elapsed = self.clock.now() - started;

                #[cfg(feature = "tracing")]
                info!(polls, "SMS wait cancelled");

                return Ok(SmsOutcome::Cancelled { elapsed, polls });
            }

            let text = self
                .transport
                .call(
                    Action::GetSms,
                    vec![
                        ("token", token.clone()),
                        ("itemid", itemid.clone()),
                        ("mobile", mobile.as_str().to_string()),
                        ("release", "1".to_string()),
                    ],
                )
                .await?;
            polls += 1;

            match ApiResponse::from_text(&text) {
                ApiResponse::Success(body) => {
                    // The server auto-releases the number along with the SMS.
                    if self.lease.as_ref() == Some(&mobile) {
                        self.lease = None;
                    }
                    self.observer.sms_received(&body);

                    #[cfg(feature = "tracing")]
                    {
                        Span::current().set_status(Status::Ok);
                        info!(polls, "SMS received");
                    }

                    return Ok(SmsOutcome::Received(body));
                }
                ApiResponse::Error(error) if error.code.is_sms_pending() => {
                    let elapsed = self.clock.now() - started;
                    if elapsed > max_wait {
                        #[cfg(feature = "tracing")]
                        warn!(
                            elapsed_secs = elapsed.as_secs_f64(),
                            polls, "timed out waiting for SMS, releasing number"
                        );

                        self.observer.wait_timed_out(elapsed);
                        self.release(Some(mobile.clone()), item_id).await?;
                        return Ok(SmsOutcome::TimedOut { elapsed, polls });
                    }

                    self.observer.poll_tick(polls, elapsed);
                    self.clock.sleep(interval).await;
                }
                ApiResponse::Error(error) => {
                    #[cfg(feature = "tracing")]
                    warn!(code = %error.code, "fatal status while polling");

                    return Err(error.into());
                }
            }
        }
    }

    /// Wait for the SMS and extract the first maximal run of digits.
    ///
    /// When the message carries no digits the number is released and
    /// [`Extraction`] is raised; when polling timed out, [`NoSms`].
    ///
    /// [`Extraction`]: SmsLeaseError::Extraction
    /// [`NoSms`]: SmsLeaseError::NoSms
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "sms_lease.numeric_code", skip_all)
    )]
    pub async fn numeric_code(
        &mut self,
        mobile: Option<Mobile>,
        item_id: Option<u32>,
    ) -> Result<SmsCode> {
        let mobile = self.effective_mobile(mobile)?;

        match self.await_sms(Some(mobile.clone()), item_id).await? {
            SmsOutcome::Received(text) => {
                let code = DIGIT_RUN.find(&text).map(|found| SmsCode::new(found.as_str()));
                match code {
                    Some(code) => Ok(code),
                    None => {
                        self.release(Some(mobile), item_id).await?;
                        Err(SmsLeaseError::Extraction { text })
                    }
                }
            }
            // No message obtained either way.
            SmsOutcome::TimedOut { elapsed, polls }
            | SmsOutcome::Cancelled { elapsed, polls } => {
                Err(SmsLeaseError::NoSms { elapsed, polls })
            }
        }
    }
}
