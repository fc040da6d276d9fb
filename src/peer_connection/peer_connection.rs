use super::answer::{AnswerContext, build_answer};
use super::certificate::{CertificatePublisher, DtlsFingerprint, RtcCertificate};
use super::configuration::RtcConfiguration;
use super::offer::{OfferContext, build_offer};
use super::random::{self, TransportCredentials};
use super::rtc_error::RtcError;
use super::sdp_type::SdpType;
use super::session_description::SessionDescription;
use super::signaling_state::SignalingState;
use super::states::{DtlsTransportState, IceConnectionState, IceGatheringState, PeerConnectionState};
use super::transceiver::{RtpTransceiverDirection, Transceiver, TransceiverId};
use crate::log::{LogSink, NoopLogSink};
use crate::sdp::attribute::AttributeList;
use crate::sdp::media::MediaKind;
use crate::sdp::origin::Origin;
use crate::sdp::session::Session;
use crate::{sink_debug, sink_info, sink_trace};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::sync::Arc;

/// Mid bookkeeping as of the last time the connection entered `stable`.
#[derive(Debug, Clone, Default)]
struct StableSnapshot {
    mids: Vec<Option<String>>,
    mid_counter: u64,
    data_channel_mid: Option<String>,
}

/// JSEP offer/answer engine for one peer connection.
///
/// All operations take `&mut self`; callers serialize access. The only
/// suspension point is the wait for a certificate in `create_offer` and
/// `create_answer`. Descriptions are built completely before any state is
/// committed, so a failed operation leaves the connection untouched.
pub struct PeerConnection {
    configuration: RtcConfiguration,
    certificates: CertificatePublisher,
    rng: Box<dyn RngCore + Send>,
    logger: Arc<dyn LogSink>,

    signaling_state: SignalingState,
    connection_state: PeerConnectionState,
    ice_connection_state: IceConnectionState,
    ice_gathering_state: IceGatheringState,
    dtls_transport_state: DtlsTransportState,
    is_closed: bool,

    current_local_description: Option<SessionDescription>,
    pending_local_description: Option<SessionDescription>,
    current_remote_description: Option<SessionDescription>,
    pending_remote_description: Option<SessionDescription>,
    can_trickle_ice_candidates: Option<bool>,

    document_origin: Option<Origin>,
    sess_version: i64,
    last_created_offer: String,
    last_created_answer: String,

    transceivers: Vec<Transceiver>,
    mid_counter: u64,
    data_channel_mid: Option<String>,
    local_credentials: Option<TransportCredentials>,
    stable_snapshot: StableSnapshot,
    /// Transceivers created by the remote offer being negotiated.
    remote_created: Vec<usize>,
}

impl PeerConnection {
    /// Creates a connection seeded from the OS entropy source.
    #[must_use]
    pub fn new(configuration: RtcConfiguration) -> Self {
        Self::with_rng(configuration, StdRng::from_entropy())
    }

    /// Creates a connection drawing ids and credentials from `rng`.
    pub fn with_rng(configuration: RtcConfiguration, rng: impl RngCore + Send + 'static) -> Self {
        let certificates = CertificatePublisher::new(configuration.certificates.clone());
        Self {
            configuration,
            certificates,
            rng: Box::new(rng),
            logger: Arc::new(NoopLogSink),
            signaling_state: SignalingState::Stable,
            connection_state: PeerConnectionState::New,
            ice_connection_state: IceConnectionState::New,
            ice_gathering_state: IceGatheringState::New,
            dtls_transport_state: DtlsTransportState::New,
            is_closed: false,
            current_local_description: None,
            pending_local_description: None,
            current_remote_description: None,
            pending_remote_description: None,
            can_trickle_ice_candidates: None,
            document_origin: None,
            sess_version: 0,
            last_created_offer: String::new(),
            last_created_answer: String::new(),
            transceivers: Vec::new(),
            mid_counter: 0,
            data_channel_mid: None,
            local_credentials: None,
            stable_snapshot: StableSnapshot::default(),
            remote_created: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn LogSink>) -> Self {
        self.logger = logger;
        self
    }

    // --- GETTERS ---

    #[must_use]
    pub const fn configuration(&self) -> &RtcConfiguration {
        &self.configuration
    }

    /// Handle the certificate provider uses to publish certificates.
    #[must_use]
    pub fn certificate_publisher(&self) -> CertificatePublisher {
        self.certificates.clone()
    }

    #[must_use]
    pub const fn signaling_state(&self) -> SignalingState {
        self.signaling_state
    }

    #[must_use]
    pub const fn connection_state(&self) -> PeerConnectionState {
        self.connection_state
    }

    #[must_use]
    pub const fn ice_connection_state(&self) -> IceConnectionState {
        self.ice_connection_state
    }

    #[must_use]
    pub const fn ice_gathering_state(&self) -> IceGatheringState {
        self.ice_gathering_state
    }

    #[must_use]
    pub const fn dtls_transport_state(&self) -> DtlsTransportState {
        self.dtls_transport_state
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// `None` until a remote description was applied.
    #[must_use]
    pub const fn can_trickle_ice_candidates(&self) -> Option<bool> {
        self.can_trickle_ice_candidates
    }

    #[must_use]
    pub const fn current_local_description(&self) -> Option<&SessionDescription> {
        self.current_local_description.as_ref()
    }

    #[must_use]
    pub const fn pending_local_description(&self) -> Option<&SessionDescription> {
        self.pending_local_description.as_ref()
    }

    #[must_use]
    pub const fn current_remote_description(&self) -> Option<&SessionDescription> {
        self.current_remote_description.as_ref()
    }

    #[must_use]
    pub const fn pending_remote_description(&self) -> Option<&SessionDescription> {
        self.pending_remote_description.as_ref()
    }

    /// Pending local description if any, else the current one.
    #[must_use]
    pub fn local_description(&self) -> Option<&SessionDescription> {
        self.pending_local_description
            .as_ref()
            .or(self.current_local_description.as_ref())
    }

    /// Pending remote description if any, else the current one.
    #[must_use]
    pub fn remote_description(&self) -> Option<&SessionDescription> {
        self.pending_remote_description
            .as_ref()
            .or(self.current_remote_description.as_ref())
    }

    #[must_use]
    pub fn transceivers(&self) -> &[Transceiver] {
        &self.transceivers
    }

    /// # Errors
    /// [`RtcError::UnknownTransceiver`] for an id from another connection.
    pub fn transceiver(&self, id: TransceiverId) -> Result<&Transceiver, RtcError> {
        self.transceivers.get(id.0).ok_or(RtcError::UnknownTransceiver)
    }

    /// # Errors
    /// [`RtcError::UnknownTransceiver`] for an id from another connection.
    pub fn transceiver_mut(&mut self, id: TransceiverId) -> Result<&mut Transceiver, RtcError> {
        self.transceivers.get_mut(id.0).ok_or(RtcError::UnknownTransceiver)
    }

    // --- OPERATIONS ---

    /// Adds a transceiver; it gets a mid with the next offer.
    ///
    /// # Errors
    /// [`RtcError::InvalidState`] once the connection is closed.
    pub fn add_transceiver(&mut self, transceiver: Transceiver) -> Result<TransceiverId, RtcError> {
        self.ensure_open()?;
        self.transceivers.push(transceiver);
        Ok(TransceiverId(self.transceivers.len() - 1))
    }

    /// Builds an offer from the current transceivers.
    ///
    /// Suspends until at least one certificate is available. Mids assigned to
    /// new transceivers are committed only once the offer is complete.
    ///
    /// # Errors
    /// [`RtcError::InvalidState`] when closed or not in `stable`/`have-local-offer`,
    /// [`RtcError::Certificate`] when fingerprints cannot be computed.
    pub async fn create_offer(&mut self) -> Result<SessionDescription, RtcError> {
        self.ensure_open()?;
        if !matches!(
            self.signaling_state,
            SignalingState::Stable | SignalingState::HaveLocalOffer
        ) {
            return Err(RtcError::invalid_state(format!(
                "cannot create an offer in signaling state {}",
                self.signaling_state
            )));
        }
        let fingerprints = await_fingerprints(&self.certificates, &*self.logger).await?;

        if self.remote_description().is_some() {
            self.advance_mid_counter_past_local();
        }
        let credentials = match &self.local_credentials {
            Some(c) => c.clone(),
            None => TransportCredentials::generate(&mut self.rng),
        };
        let origin = self.next_origin();

        let built = build_offer(&OfferContext {
            policy: self.configuration.bundle_policy,
            transceivers: &self.transceivers,
            credentials: &credentials,
            fingerprints: &fingerprints,
            origin,
            mid_counter: self.mid_counter,
            data_channel_mid: self.data_channel_mid.as_deref(),
        });

        for (id, mid) in built.mid_updates {
            if let Some(t) = self.transceivers.get_mut(id.0) {
                t.set_mid(Some(mid));
            }
        }
        self.mid_counter = built.mid_counter;
        self.data_channel_mid = Some(built.data_channel_mid);
        self.local_credentials = Some(credentials);
        self.sess_version += 1;

        let offer = SessionDescription::from_session(SdpType::Offer, built.session);
        self.last_created_offer.clone_from(&offer.sdp);
        sink_info!(
            self.logger,
            "[JSEP] created offer v{} with {} media sections",
            self.sess_version - 1,
            offer.session().map_or(0, |s| s.media.len())
        );
        Ok(offer)
    }

    /// Builds an answer to the pending remote offer.
    ///
    /// # Errors
    /// [`RtcError::InvalidState`] outside `have-remote-offer`/`have-local-pranswer`,
    /// policy errors ([`RtcError::MissingAttribute`], [`RtcError::RtpMap`]) from
    /// the remote offer, [`RtcError::Certificate`] for unusable certificates.
    pub async fn create_answer(&mut self) -> Result<SessionDescription, RtcError> {
        self.ensure_open()?;
        if !matches!(
            self.signaling_state,
            SignalingState::HaveRemoteOffer | SignalingState::HaveLocalPranswer
        ) {
            return Err(RtcError::invalid_state(format!(
                "cannot create an answer in signaling state {}",
                self.signaling_state
            )));
        }
        let fingerprints = await_fingerprints(&self.certificates, &*self.logger).await?;
        let remote = self
            .remote_description()
            .ok_or_else(|| RtcError::invalid_state("no remote offer to answer"))?
            .to_session()?;
        let origin = self.next_origin();

        let built = build_answer(
            &AnswerContext {
                policy: self.configuration.bundle_policy,
                transceivers: &self.transceivers,
                remote: &remote,
                fingerprints: &fingerprints,
                origin,
            },
            &mut self.rng,
        )?;
        for rejection in &built.rejected {
            sink_debug!(
                self.logger,
                "[JSEP] rejecting remote section {} (mid {:?}): {}",
                rejection.index,
                rejection.mid,
                rejection.reason.as_str()
            );
        }
        self.sess_version += 1;

        let answer = SessionDescription::from_session(SdpType::Answer, built.session);
        self.last_created_answer.clone_from(&answer.sdp);
        sink_info!(
            self.logger,
            "[JSEP] created answer v{} ({} of {} sections rejected)",
            self.sess_version - 1,
            built.rejected.len(),
            remote.media.len()
        );
        Ok(answer)
    }

    /// Applies a local description, or an implicit one when `None`.
    ///
    /// An implicit description is an offer in `stable`, `have-local-offer` and
    /// `have-remote-pranswer`, an answer otherwise. It reuses the last created
    /// offer/answer, creating one first if none exists. A description with
    /// empty text is treated the same way for its type.
    ///
    /// # Errors
    /// [`RtcError::InvalidState`] when the type is not legal in the current
    /// state, [`RtcError::InvalidModification`] when the text differs from the
    /// last created offer/answer, plus any error of the implied creation.
    pub async fn set_local_description(
        &mut self,
        description: Option<SessionDescription>,
    ) -> Result<(), RtcError> {
        self.ensure_open()?;
        let description = match description {
            Some(d) if d.sdp_type == SdpType::Rollback => return self.rollback(),
            Some(d) if d.sdp.is_empty() => self.implicit_local_description(d.sdp_type).await?,
            Some(d) => d,
            None => {
                let sdp_type = match self.signaling_state {
                    SignalingState::Stable
                    | SignalingState::HaveLocalOffer
                    | SignalingState::HaveRemotePranswer => SdpType::Offer,
                    _ => SdpType::Answer,
                };
                self.implicit_local_description(sdp_type).await?
            }
        };

        match description.sdp_type {
            SdpType::Offer => {
                self.expect_state(
                    &[SignalingState::Stable, SignalingState::HaveLocalOffer],
                    "local offer",
                )?;
                if description.sdp != self.last_created_offer {
                    return Err(RtcError::invalid_modification(
                        "description was altered since last call to createOffer",
                    ));
                }
                self.pending_local_description = Some(description.decoded()?);
                self.transition(SignalingState::HaveLocalOffer);
            }
            SdpType::Answer | SdpType::Pranswer => {
                self.expect_state(
                    &[SignalingState::HaveRemoteOffer, SignalingState::HaveLocalPranswer],
                    "local answer",
                )?;
                if description.sdp != self.last_created_answer {
                    return Err(RtcError::invalid_modification(
                        "description was altered since last call to createAnswer",
                    ));
                }
                let description = description.decoded()?;
                if description.sdp_type == SdpType::Pranswer {
                    self.pending_local_description = Some(description);
                    self.transition(SignalingState::HaveLocalPranswer);
                } else {
                    let offer = self.take_remote_offer()?;
                    self.apply_answer(&offer, &description, true);
                    self.current_local_description = Some(description);
                    self.pending_local_description = None;
                    self.transition(SignalingState::Stable);
                }
            }
            SdpType::Rollback => return self.rollback(),
        }
        Ok(())
    }

    /// Applies a description received from the remote peer.
    ///
    /// Remote offers associate their sections with local transceivers: by
    /// mid, else with an unassociated transceiver of the same kind, else with
    /// a new `recvonly` transceiver.
    ///
    /// # Errors
    /// [`RtcError::InvalidState`] when the type is not legal in the current
    /// state or when rolling back outside `have-local-offer`/`have-remote-offer`,
    /// [`RtcError::Sdp`] when the text does not decode.
    pub fn set_remote_description(&mut self, description: SessionDescription) -> Result<(), RtcError> {
        self.ensure_open()?;
        if description.sdp_type == SdpType::Rollback {
            return self.rollback();
        }

        match description.sdp_type {
            SdpType::Offer => {
                self.expect_state(
                    &[SignalingState::Stable, SignalingState::HaveRemoteOffer],
                    "remote offer",
                )?;
                let description = description.decoded()?;
                let session = description.to_session()?;
                self.associate_transceivers(&session);
                self.update_trickle(&session);
                self.pending_remote_description = Some(description);
                self.transition(SignalingState::HaveRemoteOffer);
            }
            SdpType::Answer | SdpType::Pranswer => {
                self.expect_state(
                    &[SignalingState::HaveLocalOffer, SignalingState::HaveRemotePranswer],
                    "remote answer",
                )?;
                let description = description.decoded()?;
                self.update_trickle(&description.to_session()?);
                if description.sdp_type == SdpType::Pranswer {
                    self.pending_remote_description = Some(description);
                    self.transition(SignalingState::HaveRemotePranswer);
                } else {
                    let offer = self
                        .pending_local_description
                        .take()
                        .ok_or_else(|| RtcError::invalid_state("no local offer pending"))?;
                    self.apply_answer(&offer, &description, false);
                    self.current_local_description = Some(offer);
                    self.current_remote_description = Some(description);
                    self.pending_remote_description = None;
                    self.transition(SignalingState::Stable);
                }
            }
            SdpType::Rollback => return self.rollback(),
        }
        Ok(())
    }

    /// Closes the connection. Every later operation fails with `InvalidState`.
    pub fn close(&mut self) {
        if self.is_closed {
            return;
        }
        self.is_closed = true;
        for t in &mut self.transceivers {
            t.mark_stopped();
        }
        self.connection_state = PeerConnectionState::Closed;
        self.ice_connection_state = IceConnectionState::Closed;
        self.dtls_transport_state = DtlsTransportState::Closed;
        self.transition(SignalingState::Closed);
    }

    // --- INTERNALS ---

    fn ensure_open(&self) -> Result<(), RtcError> {
        if self.is_closed {
            return Err(RtcError::invalid_state("peer connection is closed"));
        }
        Ok(())
    }

    fn expect_state(&self, allowed: &[SignalingState], what: &str) -> Result<(), RtcError> {
        if allowed.contains(&self.signaling_state) {
            return Ok(());
        }
        Err(RtcError::invalid_state(format!(
            "cannot apply {what} in signaling state {}",
            self.signaling_state
        )))
    }

    fn transition(&mut self, next: SignalingState) {
        sink_info!(self.logger, "[JSEP] signaling {} -> {}", self.signaling_state, next);
        self.signaling_state = next;
        if next == SignalingState::Stable {
            self.stable_snapshot = StableSnapshot {
                mids: self.transceivers.iter().map(|t| t.mid().map(str::to_string)).collect(),
                mid_counter: self.mid_counter,
                data_channel_mid: self.data_channel_mid.clone(),
            };
            self.remote_created.clear();
        }
    }

    /// Origin for the next generated description. The session id is drawn once.
    fn next_origin(&mut self) -> Origin {
        let rng = &mut self.rng;
        let mut origin = self
            .document_origin
            .get_or_insert_with(|| Origin::new_local(random::session_id(rng), 0))
            .clone();
        origin.set_session_version(self.sess_version);
        origin
    }

    /// Keeps new mids clear of every numeric mid the current local description uses.
    fn advance_mid_counter_past_local(&mut self) {
        let Some(local) = self.current_local_description.as_ref() else {
            return;
        };
        let Ok(session) = local.to_session() else {
            return;
        };
        let next = session
            .mids()
            .filter_map(|mid| mid.parse::<u64>().ok())
            .map(|mid| mid.saturating_add(1))
            .max()
            .unwrap_or(0);
        if next > self.mid_counter {
            sink_trace!(self.logger, "[JSEP] mid counter {} -> {}", self.mid_counter, next);
            self.mid_counter = next;
        }
    }

    async fn implicit_local_description(&mut self, sdp_type: SdpType) -> Result<SessionDescription, RtcError> {
        let last = match sdp_type {
            SdpType::Offer => &self.last_created_offer,
            _ => &self.last_created_answer,
        };
        if !last.is_empty() {
            return Ok(SessionDescription::new(sdp_type, last.clone()).decoded()?);
        }
        let mut created = match sdp_type {
            SdpType::Offer => self.create_offer().await?,
            _ => self.create_answer().await?,
        };
        created.sdp_type = sdp_type;
        Ok(created)
    }

    /// The remote offer an answer is being applied against.
    fn take_remote_offer(&mut self) -> Result<SessionDescription, RtcError> {
        let offer = self
            .pending_remote_description
            .take()
            .ok_or_else(|| RtcError::invalid_state("no remote offer pending"))?;
        self.current_remote_description = Some(offer.clone());
        Ok(offer)
    }

    fn associate_transceivers(&mut self, remote: &Session) {
        for media in &remote.media {
            let Some(mid) = media.mid() else { continue };
            if let Ok(n) = mid.parse::<u64>() {
                self.mid_counter = self.mid_counter.max(n.saturating_add(1));
            }
            if media.kind == MediaKind::Application {
                self.data_channel_mid = Some(mid.to_string());
                continue;
            }
            if media.is_rejected() || self.transceivers.iter().any(|t| t.mid() == Some(mid)) {
                continue;
            }
            if let Some(t) = self
                .transceivers
                .iter_mut()
                .find(|t| t.mid().is_none() && t.is_active() && t.kind() == media.kind)
            {
                t.set_mid(Some(mid.to_string()));
                continue;
            }
            let mut t = Transceiver::new(media.kind, RtpTransceiverDirection::Recvonly);
            t.set_mid(Some(mid.to_string()));
            self.transceivers.push(t);
            self.remote_created.push(self.transceivers.len() - 1);
            sink_trace!(self.logger, "[JSEP] created {} transceiver for remote mid {}", media.kind, mid);
        }
    }

    /// Records negotiated directions. Sections are paired by position.
    fn apply_answer(&mut self, offer: &SessionDescription, answer: &SessionDescription, local_answer: bool) {
        let (Some(offer), Some(answer)) = (offer.session(), answer.session()) else {
            return;
        };
        for (offered, answered) in offer.media.iter().zip(&answer.media) {
            let Some(mid) = offered.mid() else { continue };
            let Some(t) = self.transceivers.iter_mut().find(|t| t.mid() == Some(mid)) else {
                continue;
            };
            if answered.is_rejected() {
                t.mark_stopped();
                continue;
            }
            let direction = RtpTransceiverDirection::from_media(answered);
            let current = if local_answer { direction } else { direction.complement() };
            t.set_current_direction(Some(current));
        }
        for t in &mut self.transceivers {
            if t.stopping() {
                t.mark_stopped();
            }
        }
    }

    fn update_trickle(&mut self, remote: &Session) {
        let trickle = remote
            .attribute_value("ice-options")
            .is_some_and(|v| v.split_whitespace().any(|opt| opt == "trickle"));
        self.can_trickle_ice_candidates = Some(trickle);
    }

    fn rollback(&mut self) -> Result<(), RtcError> {
        if !self.signaling_state.can_rollback() {
            return Err(RtcError::invalid_state(format!(
                "cannot roll back in signaling state {}",
                self.signaling_state
            )));
        }
        let snapshot = std::mem::take(&mut self.stable_snapshot);
        for (i, t) in self.transceivers.iter_mut().enumerate() {
            t.set_mid(snapshot.mids.get(i).cloned().flatten());
        }
        for idx in std::mem::take(&mut self.remote_created) {
            if let Some(t) = self.transceivers.get_mut(idx) {
                t.mark_stopped();
            }
        }
        self.mid_counter = snapshot.mid_counter;
        self.data_channel_mid = snapshot.data_channel_mid;
        self.pending_local_description = None;
        self.pending_remote_description = None;
        self.transition(SignalingState::Stable);
        Ok(())
    }
}

/// Waits for a certificate and collects the fingerprints of every one published.
async fn await_fingerprints(
    certificates: &CertificatePublisher,
    logger: &dyn LogSink,
) -> Result<Vec<DtlsFingerprint>, RtcError> {
    if !certificates.is_ready() {
        sink_debug!(logger, "[JSEP] waiting for a certificate");
    }
    let certificates: Vec<RtcCertificate> = certificates.wait_ready().await?;
    let mut fingerprints = Vec::new();
    for certificate in &certificates {
        fingerprints.extend(certificate.fingerprints()?);
    }
    Ok(fingerprints)
}
