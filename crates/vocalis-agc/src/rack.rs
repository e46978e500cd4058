//! Channel arena with stereo linking.
//!
//! A [`ChannelRack`] owns every [`Channel`] and hands out [`ChannelId`]s. Two
//! channels can be made partners; either one may then delegate its control
//! authority to the other. The host runs the single shared control update on the
//! average of both inputs, and the delegated channel borrows the host's filter
//! settings and gain while keeping its own delay line and filter accumulators.
//!
//! ```text
//!            ┌──────── host ────────┐
//! L ──filter─┤ delay ─────────── × ──┼──► L out
//!            │   └─ avg(L,R) ─ gain ─┤
//! R ──filter─┤ delay ─────────── × ──┼──► R out
//!            └───── delegated ───────┘
//! ```
//!
//! Linking and unlinking touch no audio buffers, so they are safe to toggle
//! between callbacks.
//!
//! # Example
//!
//! ```rust
//! use vocalis_agc::ChannelRack;
//!
//! let mut rack = ChannelRack::new();
//! let left = rack.add_channel(48000, 0.01).unwrap();
//! let right = rack.add_channel(48000, 0.01).unwrap();
//! rack.set_as_partners(left, right).unwrap();
//! rack.set_partnered_mode(right, true).unwrap();
//! assert_eq!(rack.host_of(right), Some(left));
//! ```

use crate::channel::Channel;
use crate::error::{AgcError, LinkError};

/// Handle to a channel in a [`ChannelRack`].
///
/// Ids are assigned sequentially and never reused within a rack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub(crate) u32);

impl ChannelId {
    /// Raw numeric identifier.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Which channel runs the control update for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Authority {
    /// Runs its own control update.
    #[default]
    SelfHosted,
    /// Borrows filter settings and gain from the given partner.
    DelegatedTo(ChannelId),
}

#[derive(Debug)]
struct Slot {
    channel: Channel,
    partner: Option<ChannelId>,
    authority: Authority,
}

/// Arena of AGC channels.
#[derive(Debug, Default)]
pub struct ChannelRack {
    slots: Vec<Option<Slot>>,
}

impl ChannelRack {
    /// Empty rack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a self-hosted channel and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`AgcError`] when the channel cannot be built.
    pub fn add_channel(
        &mut self,
        sample_rate: u32,
        lookahead_seconds: f32,
    ) -> Result<ChannelId, AgcError> {
        let channel = Channel::new(sample_rate, lookahead_seconds)?;
        let index = u32::try_from(self.slots.len())
            .map_err(|_| AgcError::invalid("too many channels in rack"))?;
        self.slots.push(Some(Slot {
            channel,
            partner: None,
            authority: Authority::SelfHosted,
        }));
        Ok(ChannelId(index))
    }

    /// Remove a channel, unlinking its partner.
    ///
    /// The former partner becomes self-hosted.
    pub fn remove_channel(&mut self, id: ChannelId) -> Result<Channel, LinkError> {
        let partner = self.slot(id).ok_or(LinkError::UnknownChannel(id))?.partner;
        // unlink while `id` is still present so a follower can take over its gain
        if let Some(partner) = partner {
            self.unlink(partner);
        }
        let slot = self
            .slots
            .get_mut(id.0 as usize)
            .and_then(Option::take)
            .ok_or(LinkError::UnknownChannel(id))?;
        tracing::debug!(channel = %id, "AGC channel removed");
        Ok(slot.channel)
    }

    /// Number of live channels.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// True when the rack holds no channels.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ids of all live channels in creation order.
    pub fn ids(&self) -> impl Iterator<Item = ChannelId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| ChannelId(i as u32))
    }

    /// Borrow a channel.
    ///
    /// Reads the channel's own state. For a delegated channel, [`Channel::gain`]
    /// and the meters are not the ones applied to its output; use
    /// [`host_of`](Self::host_of) to find the controlling channel.
    pub fn get(&self, id: ChannelId) -> Option<&Channel> {
        self.slot(id).map(|s| &s.channel)
    }

    /// Borrow a channel mutably, e.g. to set parameters.
    ///
    /// Calling the channel's own stage methods bypasses linking: on a delegated
    /// channel they run its private control state instead of the host's. Drive
    /// linked channels through [`process_stage1`](Self::process_stage1),
    /// [`process_stage2`](Self::process_stage2) and
    /// [`process_stage3`](Self::process_stage3).
    pub fn get_mut(&mut self, id: ChannelId) -> Option<&mut Channel> {
        self.slot_mut(id).map(|s| &mut s.channel)
    }

    /// Make `a` and `b` partners.
    ///
    /// Symmetric and idempotent. Any previous partner of either channel is
    /// unlinked and returned to self-hosting; `a` and `b` keep their authority
    /// only if it already pointed at each other.
    pub fn set_as_partners(&mut self, a: ChannelId, b: ChannelId) -> Result<(), LinkError> {
        if a == b {
            return Err(LinkError::SelfPartner(a));
        }
        self.slot(a).ok_or(LinkError::UnknownChannel(a))?;
        self.slot(b).ok_or(LinkError::UnknownChannel(b))?;

        for (me, other) in [(a, b), (b, a)] {
            let previous = self.slot(me).and_then(|s| s.partner);
            if let Some(previous) = previous.filter(|&p| p != other) {
                self.self_host(me);
                self.unlink(previous);
            }
            if let Some(slot) = self.slot_mut(me) {
                slot.partner = Some(other);
            }
        }
        tracing::debug!(a = %a, b = %b, "AGC channels linked");
        Ok(())
    }

    /// Delegate control of `id` to its partner (`true`) or restore self-hosting.
    ///
    /// # Errors
    ///
    /// [`LinkError::NoPartner`] when `id` has no partner, and
    /// [`LinkError::ConflictingHosts`] when the partner already delegates to `id`.
    pub fn set_partnered_mode(&mut self, id: ChannelId, delegate: bool) -> Result<(), LinkError> {
        let partner = self.slot(id).ok_or(LinkError::UnknownChannel(id))?.partner;
        if !delegate {
            self.self_host(id);
            tracing::debug!(channel = %id, "AGC channel self-hosted");
            return Ok(());
        }

        let partner = partner.ok_or(LinkError::NoPartner(id))?;
        let partner_authority = self
            .slot(partner)
            .map(|s| s.authority)
            .ok_or(LinkError::UnknownChannel(partner))?;
        if partner_authority == Authority::DelegatedTo(id) {
            debug_assert!(
                false,
                "{id} and {partner} cannot both delegate control to each other"
            );
            return Err(LinkError::ConflictingHosts {
                channel: id,
                partner,
            });
        }

        if let Some(slot) = self.slot_mut(id) {
            slot.authority = Authority::DelegatedTo(partner);
        }
        tracing::debug!(channel = %id, host = %partner, "AGC channel delegated");
        Ok(())
    }

    /// Partner of `id`, if linked.
    pub fn partner_of(&self, id: ChannelId) -> Option<ChannelId> {
        self.slot(id).and_then(|s| s.partner)
    }

    /// Authority marker of `id`.
    pub fn authority(&self, id: ChannelId) -> Option<Authority> {
        self.slot(id).map(|s| s.authority)
    }

    /// Channel whose control state drives `id` (itself when self-hosted).
    pub fn host_of(&self, id: ChannelId) -> Option<ChannelId> {
        match self.slot(id)?.authority {
            Authority::SelfHosted => Some(id),
            Authority::DelegatedTo(host) => Some(host),
        }
    }

    /// Filter and store one input sample for `id`.
    ///
    /// A delegated channel filters with its host's settings.
    #[inline]
    pub fn process_stage1(&mut self, id: ChannelId, input: f32) -> Result<(), LinkError> {
        match self.authority(id).ok_or(LinkError::UnknownChannel(id))? {
            Authority::SelfHosted => {
                if let Some(slot) = self.slot_mut(id) {
                    slot.channel.process_stage1(input);
                }
            }
            Authority::DelegatedTo(host) => {
                let (me, host) = self.pair_mut(id, host)?;
                me.channel
                    .process_stage1_with(host.channel.filter_settings(), input);
            }
        }
        Ok(())
    }

    /// Run one control update for `id`.
    ///
    /// A no-op on a delegated channel. A host whose partner delegates to it
    /// tracks the average of both inputs.
    #[inline]
    pub fn process_stage2(&mut self, id: ChannelId, mic_muted: bool) -> Result<(), LinkError> {
        let slot = self.slot(id).ok_or(LinkError::UnknownChannel(id))?;
        if slot.authority != Authority::SelfHosted {
            return Ok(());
        }

        let follower = slot
            .partner
            .filter(|&p| self.authority(p) == Some(Authority::DelegatedTo(id)));
        match follower {
            Some(partner) => {
                let (me, other) = self.pair_mut(id, partner)?;
                let detect = 0.5 * (me.channel.input() + other.channel.input());
                me.channel.update_control(detect, mic_muted);
            }
            None => {
                if let Some(slot) = self.slot_mut(id) {
                    slot.channel.process_stage2(mic_muted);
                }
            }
        }
        Ok(())
    }

    /// Produce the next output sample for `id`.
    ///
    /// A delegated channel scales its own delayed sample by the host's gain.
    #[inline]
    pub fn process_stage3(&self, id: ChannelId) -> Result<f32, LinkError> {
        let slot = self.slot(id).ok_or(LinkError::UnknownChannel(id))?;
        match slot.authority {
            Authority::SelfHosted => Ok(slot.channel.process_stage3()),
            Authority::DelegatedTo(host) => {
                let host = self.slot(host).ok_or(LinkError::UnknownChannel(host))?;
                Ok(slot.channel.delayed_sample() * host.channel.gain())
            }
        }
    }

    fn unlink(&mut self, id: ChannelId) {
        self.self_host(id);
        if let Some(slot) = self.slot_mut(id) {
            slot.partner = None;
        }
    }

    /// Return `id` to self-hosting. A former follower continues from its host's
    /// current gain instead of its own stale ramp.
    fn self_host(&mut self, id: ChannelId) {
        let Some(Authority::DelegatedTo(host)) = self.authority(id) else {
            return;
        };
        let host_gain = self.get(host).map(Channel::gain);
        if let Some(slot) = self.slot_mut(id) {
            slot.authority = Authority::SelfHosted;
            if let Some(gain) = host_gain {
                slot.channel.seed_gain(gain);
            }
        }
    }

    fn slot(&self, id: ChannelId) -> Option<&Slot> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: ChannelId) -> Option<&mut Slot> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// Borrow two distinct slots at once.
    fn pair_mut(
        &mut self,
        a: ChannelId,
        b: ChannelId,
    ) -> Result<(&mut Slot, &mut Slot), LinkError> {
        if a == b {
            return Err(LinkError::SelfPartner(a));
        }
        self.slot(a).ok_or(LinkError::UnknownChannel(a))?;
        self.slot(b).ok_or(LinkError::UnknownChannel(b))?;

        let (ia, ib) = (a.0 as usize, b.0 as usize);
        let (head, tail) = self.slots.split_at_mut(ia.max(ib));
        let (low, high) = (&mut head[ia.min(ib)], &mut tail[0]);
        match (low.as_mut(), high.as_mut()) {
            (Some(low), Some(high)) if ia < ib => Ok((low, high)),
            (Some(low), Some(high)) => Ok((high, low)),
            _ => Err(LinkError::UnknownChannel(a)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo() -> (ChannelRack, ChannelId, ChannelId) {
        let mut rack = ChannelRack::new();
        let a = rack.add_channel(48000, 0.01).unwrap();
        let b = rack.add_channel(48000, 0.01).unwrap();
        (rack, a, b)
    }

    #[test]
    fn partners_are_symmetric_and_idempotent() {
        let (mut rack, a, b) = stereo();
        rack.set_as_partners(a, b).unwrap();
        rack.set_as_partners(b, a).unwrap();
        assert_eq!(rack.partner_of(a), Some(b));
        assert_eq!(rack.partner_of(b), Some(a));
        assert_eq!(rack.set_as_partners(a, a), Err(LinkError::SelfPartner(a)));
    }

    #[test]
    fn relinking_releases_old_partner() {
        let (mut rack, a, b) = stereo();
        let c = rack.add_channel(48000, 0.01).unwrap();
        rack.set_as_partners(a, b).unwrap();
        rack.set_partnered_mode(b, true).unwrap();

        rack.set_as_partners(a, c).unwrap();
        assert_eq!(rack.partner_of(b), None);
        assert_eq!(rack.authority(b), Some(Authority::SelfHosted));
        assert_eq!(rack.partner_of(c), Some(a));
    }

    #[test]
    fn partnered_mode_requires_partner() {
        let (mut rack, a, _) = stereo();
        assert_eq!(rack.set_partnered_mode(a, true), Err(LinkError::NoPartner(a)));
        // self-hosting is always allowed
        rack.set_partnered_mode(a, false).unwrap();
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "cannot both delegate"))]
    fn mutual_delegation_is_rejected() {
        let (mut rack, a, b) = stereo();
        rack.set_as_partners(a, b).unwrap();
        rack.set_partnered_mode(a, true).unwrap();
        let err = rack.set_partnered_mode(b, true);
        assert_eq!(
            err,
            Err(LinkError::ConflictingHosts {
                channel: b,
                partner: a
            })
        );
    }

    #[test]
    fn removing_host_restores_follower() {
        let (mut rack, a, b) = stereo();
        rack.set_as_partners(a, b).unwrap();
        rack.set_partnered_mode(b, true).unwrap();
        rack.remove_channel(a).unwrap();

        assert_eq!(rack.len(), 1);
        assert_eq!(rack.host_of(b), Some(b));
        assert_eq!(rack.partner_of(b), None);
        assert!(rack.get(a).is_none());
        assert_eq!(rack.process_stage3(a), Err(LinkError::UnknownChannel(a)));
        assert!(matches!(
            rack.remove_channel(a),
            Err(LinkError::UnknownChannel(_))
        ));
    }

    /// Link a pair, let the host settle on a tone and return its gain.
    fn settled_pair() -> (ChannelRack, ChannelId, ChannelId, usize) {
        let (mut rack, a, b) = stereo();
        rack.set_as_partners(a, b).unwrap();
        rack.set_partnered_mode(b, true).unwrap();
        let n = 9600;
        for i in 0..n {
            rack.process_stage1(a, tone(i)).unwrap();
            rack.process_stage1(b, tone(i)).unwrap();
            rack.process_stage2(a, false).unwrap();
            rack.process_stage2(b, false).unwrap();
        }
        (rack, a, b, n)
    }

    fn tone(i: usize) -> f32 {
        0.5 * (core::f32::consts::TAU * 440.0 * i as f32 / 48000.0).sin()
    }

    #[test]
    fn self_hosting_continues_from_host_gain() {
        let (mut rack, a, b, n) = settled_pair();
        let host_gain = rack.get(a).unwrap().gain();
        assert!(host_gain > 0.1);
        assert_eq!(rack.get(b).unwrap().gain(), 0.0);
        let linked_out = rack.process_stage3(b).unwrap();

        rack.set_partnered_mode(b, false).unwrap();
        assert_eq!(rack.get(b).unwrap().gain(), host_gain);
        let out = rack.process_stage3(b).unwrap();
        assert_eq!(out, rack.get(b).unwrap().delayed_sample() * host_gain);
        assert_eq!(out, linked_out);

        // afterwards the gain moves at most one ramp step per update
        let step = rack.get(b).unwrap().control().gain_step() * 1.0001;
        let mut prev = host_gain;
        for i in n..n + 100 {
            rack.process_stage1(b, tone(i)).unwrap();
            rack.process_stage2(b, false).unwrap();
            let gain = rack.get(b).unwrap().gain();
            assert!((gain - prev).abs() <= step);
            assert!(gain > 0.5 * host_gain);
            prev = gain;
        }
    }

    #[test]
    fn follower_of_removed_host_keeps_its_gain() {
        let (mut rack, a, b, _) = settled_pair();
        let host_gain = rack.get(a).unwrap().gain();
        rack.remove_channel(a).unwrap();
        assert_eq!(rack.get(b).unwrap().gain(), host_gain);
    }

    #[test]
    fn relinked_follower_keeps_its_gain() {
        let (mut rack, a, b, _) = settled_pair();
        let host_gain = rack.get(a).unwrap().gain();
        let c = rack.add_channel(48000, 0.01).unwrap();
        rack.set_as_partners(b, c).unwrap();
        assert_eq!(rack.authority(b), Some(Authority::SelfHosted));
        assert_eq!(rack.get(b).unwrap().gain(), host_gain);
    }

    #[test]
    fn ids_are_not_reused() {
        let (mut rack, a, b) = stereo();
        rack.remove_channel(a).unwrap();
        let c = rack.add_channel(48000, 0.01).unwrap();
        assert_ne!(c, a);
        assert_eq!(rack.ids().collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn delegated_channel_uses_host_gain() {
        let (mut rack, a, b) = stereo();
        rack.set_as_partners(a, b).unwrap();
        rack.set_partnered_mode(b, true).unwrap();

        for n in 0..2000 {
            let x = if n % 64 < 32 { 0.5 } else { -0.5 };
            rack.process_stage1(a, x).unwrap();
            rack.process_stage1(b, -x).unwrap();
            rack.process_stage2(a, false).unwrap();
            rack.process_stage2(b, false).unwrap();

            let out_b = rack.process_stage3(b).unwrap();
            let host_gain = rack.get(a).unwrap().gain();
            let delayed_b = rack.get(b).unwrap().delayed_sample();
            assert_eq!(out_b, delayed_b * host_gain);
        }
        // the delegated channel never ran its own control update
        assert_eq!(rack.get(b).unwrap().gain(), 0.0);
        assert!(rack.get(a).unwrap().gain() > 0.0);
    }

    #[test]
    fn host_detects_on_average_of_pair() {
        let (mut rack, a, b) = stereo();
        rack.set_as_partners(a, b).unwrap();
        rack.set_partnered_mode(b, true).unwrap();

        // equal and opposite inputs cancel in the average
        for n in 0..2000 {
            let x = if n % 64 < 32 { 0.5 } else { -0.5 };
            rack.process_stage1(a, x).unwrap();
            rack.process_stage1(b, -x).unwrap();
            rack.process_stage2(a, false).unwrap();
        }
        let host = rack.get(a).unwrap();
        assert!(host.control().level() < 1e-6);
        assert!(host.gate_closed());
    }
}
