//! Channel capture for the acceptor role, and the standard bring-up sequences.
use core::pin::pin;
use core::time::Duration;
use std::boxed::Box;
use std::vec::Vec;

use avdtp_traits::{Channel, ChannelError, Connection};
use embassy_futures::select::{Either, select};
use futures::StreamExt;

use super::expect::{Expected, SignalPattern};
use super::{Error, SignalingChannel};
use crate::Role;
use crate::message::SignalingPacket;
use crate::message::capability::ServiceCapability;
use crate::message::seid::SeidInformation;
use crate::message::signal::Signal;
use crate::timers::{self, Timer};

impl<CONN: Connection, TIMER: Timer> SignalingChannel<CONN, TIMER> {
    /// Install the listener that captures the peer's channels.
    ///
    /// Each captured channel gets its slot's sink right away, so no frame is lost before the
    /// session takes the channel over.
    pub(super) fn listen(&mut self) -> Result<(), Error> {
        let sinks = self.sinks.clone();

        let listener = Box::new(move |mut channel: CONN::Channel| {
            let Some(slot) = sinks.slots().claim_free() else {
                warn!("Both channels are in use, dropping incoming channel");
                return;
            };

            channel.set_sink(sinks.sink(slot));
            info!("{:?} captured {:?} channel", Role::Acceptor, slot);
            sinks.capture(slot, channel);
        });

        self.connection.listen(self.config.psm, listener)?;
        Ok(())
    }

    /// Wait until the peer opened the transport channel.
    async fn wait_for_transport(&mut self, timeout: Duration) -> Result<(), Error> {
        let mut timer = pin!(timers::after::<TIMER>(timeout));

        loop {
            self.apply_events();
            if self.transport_channel.is_some() {
                return Ok(());
            }

            match select(self.events.next(), timer.as_mut()).await {
                Either::First(Some(event)) => self.apply(event),
                Either::First(None) => return Err(Error::Channel(ChannelError::Closed)),
                Either::Second(_) => return Err(Error::ConnectionTimeout),
            }
        }
    }

    /// Answer the peer's discover command with `seid_information`.
    pub async fn accept_discover(&mut self, seid_information: Vec<SeidInformation>) -> Result<(), Error> {
        let command = self
            .expect_signal(
                SignalPattern::new(Signal::DiscoverCommand).any_transaction_label(),
                self.config.signal_timeout,
            )
            .await?;

        self.send_signal(&command.reply(Signal::DiscoverResponse { seid_information }))
    }

    /// Answer the peer's get all capabilities command with `service_capabilities`.
    pub async fn accept_get_all_capabilities(
        &mut self,
        service_capabilities: Vec<ServiceCapability>,
    ) -> Result<(), Error> {
        let command = self
            .expect_signal(
                SignalPattern::new(Signal::GetAllCapabilitiesCommand { acp_seid: 0 })
                    .any_transaction_label()
                    .any_acp_seid(),
                self.config.signal_timeout,
            )
            .await?;

        self.send_signal(&command.reply(Signal::GetAllCapabilitiesResponse { service_capabilities }))
    }

    /// Accept the peer's configuration, if it matches `expected_configuration`.
    ///
    /// Remembers the configured endpoints for later signals, such as delay reports.
    pub async fn accept_set_configuration(
        &mut self,
        expected_configuration: Vec<Expected<ServiceCapability>>,
    ) -> Result<(), Error> {
        let command = self
            .expect_signal(
                SignalPattern::new(Signal::SetConfigurationCommand {
                    acp_seid: 0,
                    int_seid: 0,
                    service_capabilities: Vec::new(),
                })
                .any_transaction_label()
                .any_acp_seid()
                .any_int_seid()
                .service_capabilities(expected_configuration),
                self.config.signal_timeout,
            )
            .await?;

        if let Signal::SetConfigurationCommand { acp_seid, int_seid, .. } = &command.signal {
            self.acp_seid = *acp_seid;
            self.int_seid = *int_seid;
        }

        self.send_signal(&command.reply(Signal::SetConfigurationResponse))
    }

    /// Wait for a single-endpoint command and accept it.
    async fn accept_command(&mut self, command: Signal, response: Signal, timeout: Duration) -> Result<(), Error> {
        let command = self
            .expect_signal(
                SignalPattern::new(command).any_transaction_label().any_acp_seid(),
                timeout,
            )
            .await?;

        self.send_signal(&command.reply(response))
    }

    /// Accept the peer's open command.
    pub async fn accept_open(&mut self, timeout: Duration) -> Result<(), Error> {
        self.accept_command(Signal::OpenCommand { acp_seid: 0 }, Signal::OpenResponse, timeout)
            .await
    }

    /// Accept the peer's start command.
    pub async fn accept_start(&mut self, timeout: Duration) -> Result<(), Error> {
        self.accept_command(Signal::StartCommand { acp_seid: 0 }, Signal::StartResponse, timeout)
            .await
    }

    /// Accept the peer's suspend command.
    pub async fn accept_suspend(&mut self, timeout: Duration) -> Result<(), Error> {
        self.accept_command(Signal::SuspendCommand { acp_seid: 0 }, Signal::SuspendResponse, timeout)
            .await
    }

    /// Accept the peer's close command.
    pub async fn accept_close(&mut self, timeout: Duration) -> Result<(), Error> {
        self.accept_command(Signal::CloseCommand { acp_seid: 0 }, Signal::CloseResponse, timeout)
            .await
    }

    /// Run the acceptor side of a stream bring-up, up to the open transport channel.
    ///
    /// The peer's configuration must carry media transport and delay reporting exactly where
    /// `service_capabilities` has them; any other capability is accepted as is.
    pub async fn accept_open_stream(
        &mut self,
        seid_information: Vec<SeidInformation>,
        service_capabilities: Vec<ServiceCapability>,
    ) -> Result<(), Error> {
        let expected_configuration = service_capabilities
            .iter()
            .map(|capability| match capability {
                ServiceCapability::MediaTransport | ServiceCapability::DelayReporting => {
                    Expected::Exact(capability.clone())
                }
                _ => Expected::Any,
            })
            .collect();

        self.accept_discover(seid_information).await?;
        self.accept_get_all_capabilities(service_capabilities).await?;
        self.accept_set_configuration(expected_configuration).await?;
        self.accept_open(self.config.signal_timeout).await?;

        self.wait_for_transport(self.config.stream_open_timeout).await
    }

    /// Report `delay_ms` of delay for the configured acceptor endpoint, and wait for the
    /// acceptance.
    pub async fn initiate_delay_report(&mut self, delay_ms: u32, timeout: Duration) -> Result<(), Error> {
        let command = SignalingPacket::new(
            self.next_transaction_label(),
            Signal::delay_report(self.acp_seid, delay_ms),
        );
        self.send_signal(&command)?;

        self.expect_signal(command.reply(Signal::DelayReportResponse), timeout)
            .await
            .map(|_| ())
    }
}
