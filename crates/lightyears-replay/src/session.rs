//! The session controller: record/replay mode state machine.
//!
//! A [`Session`] is in exactly one of three modes:
//!
//! - **idle**: random operations return live values, samples are not kept;
//! - **recording**: live values are returned and appended to the trace;
//! - **replaying**: live values are computed, then discarded in favour of
//!   the recorded ones, and every sample is checked against the trace.
//!
//! ```text
//! Idle ──begin_write──▶ Recording ──close──▶ Idle
//! Idle ──begin_read───▶ Replaying ──close──▶ Idle
//! ```
//!
//! All trace I/O funnels through [`Session::read_and_write`] and the
//! [`RandomSource`] implementation, so call order is exactly program order.

use std::mem;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::TraceConfig;
use crate::error::TraceError;
use crate::hash::TraceDigest;
use crate::reader::{TraceReader, TraceSource};
use crate::rng::{fisher_yates, DeterministicSource, RandomSource};
use crate::types::{PacketKind, Scalar, Value, GAME, HYP, RANDINT, RANDOM, SEED, SHUFFLE};
use crate::writer::{TraceSink, TraceWriter};
use crate::FORMAT_VERSION;

/// Largest difference tolerated between live and recorded distance inputs
/// and results.
pub const DISTANCE_TOLERANCE: f64 = 1e-12;

pub(crate) enum Mode {
    Idle,
    Recording(TraceWriter<TraceSink>),
    Replaying(TraceReader<TraceSource>),
}

impl Mode {
    fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording(_) => "recording",
            Self::Replaying(_) => "replaying",
        }
    }
}

/// One record or replay run: owns the trace stream and the generator.
pub struct Session {
    mode: Mode,
    source: DeterministicSource,
    seed: Option<u32>,
    challenge: Option<u32>,
    config: TraceConfig,
}

impl Session {
    /// An idle session with the default trace configuration.
    pub fn new() -> Self {
        Self::with_config(TraceConfig::default())
    }

    /// An idle session that will record with `config`.
    pub fn with_config(config: TraceConfig) -> Self {
        Self {
            mode: Mode::Idle,
            source: DeterministicSource::from_entropy(),
            seed: None,
            challenge: None,
            config,
        }
    }

    /// Start recording to `path` with a freshly drawn seed.
    pub fn begin_write(&mut self, path: impl AsRef<Path>, challenge: u32) -> Result<(), TraceError> {
        self.begin_write_seeded(path, challenge, DeterministicSource::fresh_seed())
    }

    /// Start recording to `path` with a caller-chosen seed.
    ///
    /// Writes the `GAME` version packet and the `SEED` packet, then seeds
    /// the generator.
    pub fn begin_write_seeded(
        &mut self,
        path: impl AsRef<Path>,
        challenge: u32,
        seed: u32,
    ) -> Result<(), TraceError> {
        self.require_idle("begin recording")?;
        let path = path.as_ref();

        let mut writer = TraceWriter::new(TraceSink::create(path, &self.config)?);
        writer.write(GAME.name, GAME.format, &[Value::U32(FORMAT_VERSION)])?;
        writer.write(
            SEED.name,
            SEED.format,
            &[Value::U32(seed), Value::U32(challenge)],
        )?;

        self.source = DeterministicSource::from_seed(seed);
        self.seed = Some(seed);
        self.challenge = Some(challenge);
        self.mode = Mode::Recording(writer);
        info!(path = %path.display(), seed, challenge, "recording started");
        Ok(())
    }

    /// Start replaying the trace at `path`.
    ///
    /// Validates the format version before reading anything else, seeds the
    /// generator from the recorded seed, and returns the recorded challenge
    /// so the caller can set up the same scenario.
    pub fn begin_read(&mut self, path: impl AsRef<Path>) -> Result<u32, TraceError> {
        self.require_idle("begin replay")?;
        let path = path.as_ref();

        let mut reader = TraceReader::new(TraceSource::open(path)?);
        let header = reader.read_specific(GAME.name, GAME.format)?;
        let &[Value::U32(version)] = header.as_slice() else {
            return Err(layout_error(reader.last_offset(), &GAME));
        };
        if version != FORMAT_VERSION {
            return Err(TraceError::VersionMismatch {
                expected: FORMAT_VERSION,
                found: version,
            });
        }

        let seed_packet = reader.read_specific(SEED.name, SEED.format)?;
        let &[Value::U32(seed), Value::U32(challenge)] = seed_packet.as_slice() else {
            return Err(layout_error(reader.last_offset(), &SEED));
        };

        self.source = DeterministicSource::from_seed(seed);
        self.seed = Some(seed);
        self.challenge = Some(challenge);
        self.mode = Mode::Replaying(reader);
        info!(path = %path.display(), seed, challenge, "replay started");
        Ok(challenge)
    }

    /// Stop recording or replaying and return to idle.
    ///
    /// A recording is finished and flushed; closing an idle session is a
    /// no-op.
    pub fn close(&mut self) -> Result<(), TraceError> {
        match mem::replace(&mut self.mode, Mode::Idle) {
            Mode::Idle => {}
            Mode::Recording(writer) => {
                let packets = writer.packets_written();
                let digest = writer.digest().value();
                writer.into_inner().finish()?;
                info!(packets, digest = format_args!("{digest:#018x}"), "recording closed");
            }
            Mode::Replaying(reader) => {
                info!(offset = reader.offset(), "replay closed");
            }
        }
        Ok(())
    }

    /// Drop the trace stream and the generator, keeping only what can be
    /// persisted with the rest of the game state.
    pub fn suspend(mut self) -> Result<SuspendedSession, TraceError> {
        self.close()?;
        info!(seed = ?self.seed, "session suspended");
        Ok(SuspendedSession {
            seed: self.seed,
            challenge: self.challenge,
        })
    }

    /// The single point where record and replay are compared.
    ///
    /// Recording appends a packet with `values`. Replaying reads the next
    /// packet, which must be named `name`, and fails with
    /// [`TraceError::DataMismatch`] unless its values equal `values`.
    /// Idle sessions do nothing.
    pub fn read_and_write(
        &mut self,
        name: &str,
        format: &[Scalar],
        values: &[Value],
    ) -> Result<(), TraceError> {
        match &mut self.mode {
            Mode::Idle => Ok(()),
            Mode::Recording(writer) => writer.write(name, format, values),
            Mode::Replaying(reader) => {
                let recorded = reader.read_specific(name, format)?;
                if recorded.as_slice() != values {
                    let offset = reader.last_offset();
                    warn!(packet = name, offset, "recorded data differs from live data");
                    return Err(TraceError::DataMismatch {
                        offset,
                        name: name.to_string(),
                        expected: values.to_vec(),
                        actual: recorded,
                    });
                }
                Ok(())
            }
        }
    }

    /// `true` when replaying and no packet remains.
    pub fn at_end(&mut self) -> Result<bool, TraceError> {
        match &mut self.mode {
            Mode::Replaying(reader) => Ok(reader.peek()?.is_none()),
            _ => Ok(false),
        }
    }

    /// `true` while recording.
    pub fn is_recording(&self) -> bool {
        matches!(self.mode, Mode::Recording(_))
    }

    /// `true` while replaying.
    pub fn is_replaying(&self) -> bool {
        matches!(self.mode, Mode::Replaying(_))
    }

    /// `"idle"`, `"recording"` or `"replaying"`.
    pub fn mode_name(&self) -> &'static str {
        self.mode.label()
    }

    /// Seed of the current or last trace.
    pub fn seed(&self) -> Option<u32> {
        self.seed
    }

    /// Challenge of the current or last trace.
    pub fn challenge(&self) -> Option<u32> {
        self.challenge
    }

    /// Trace configuration used when recording.
    pub fn config(&self) -> &TraceConfig {
        &self.config
    }

    /// Stream offset of the next packet to write or read.
    pub fn offset(&self) -> Option<u64> {
        match &self.mode {
            Mode::Idle => None,
            Mode::Recording(w) => Some(w.offset()),
            Mode::Replaying(r) => Some(r.offset()),
        }
    }

    /// Digest over the packets written or read so far.
    pub fn digest(&self) -> Option<TraceDigest> {
        match &self.mode {
            Mode::Idle => None,
            Mode::Recording(w) => Some(w.digest()),
            Mode::Replaying(r) => Some(r.digest()),
        }
    }

    pub(crate) fn reader_mut(&mut self) -> Option<&mut TraceReader<TraceSource>> {
        match &mut self.mode {
            Mode::Replaying(reader) => Some(reader),
            _ => None,
        }
    }

    fn require_idle(&self, operation: &'static str) -> Result<(), TraceError> {
        match self.mode {
            Mode::Idle => Ok(()),
            _ => Err(TraceError::InvalidMode {
                operation,
                mode: self.mode.label(),
            }),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!(error = %e, "failed to close trace on drop");
        }
    }
}

impl RandomSource for Session {
    fn uniform_float(&mut self) -> Result<f64, TraceError> {
        let live = self.source.uniform_float()?;
        match &mut self.mode {
            Mode::Idle => Ok(live),
            Mode::Recording(writer) => {
                writer.write(RANDOM.name, RANDOM.format, &[Value::F64(live)])?;
                Ok(live)
            }
            Mode::Replaying(reader) => {
                let values = reader.read_specific(RANDOM.name, RANDOM.format)?;
                let &[Value::F64(recorded)] = values.as_slice() else {
                    return Err(layout_error(reader.last_offset(), &RANDOM));
                };
                Ok(recorded)
            }
        }
    }

    fn uniform_int(&mut self, low: i64, high: i64) -> Result<i64, TraceError> {
        let live = self.source.uniform_int(low, high)?;
        // The bare draw validated both bounds as i32.
        let bounds = [Value::I32(low as i32), Value::I32(high as i32)];
        match &mut self.mode {
            Mode::Idle => Ok(live),
            Mode::Recording(writer) => {
                writer.write(
                    RANDINT.name,
                    RANDINT.format,
                    &[bounds[0], bounds[1], Value::I32(live as i32)],
                )?;
                Ok(live)
            }
            Mode::Replaying(reader) => {
                let values = reader.read_specific(RANDINT.name, RANDINT.format)?;
                let offset = reader.last_offset();
                let &[rec_low @ Value::I32(_), rec_high @ Value::I32(_), Value::I32(recorded)] =
                    values.as_slice()
                else {
                    return Err(layout_error(offset, &RANDINT));
                };
                if [rec_low, rec_high] != bounds {
                    warn!(offset, low, high, "recorded bounds differ from live bounds");
                    return Err(TraceError::DataMismatch {
                        offset,
                        name: RANDINT.name.to_string(),
                        expected: bounds.to_vec(),
                        actual: vec![rec_low, rec_high],
                    });
                }
                let recorded = i64::from(recorded);
                if !(low..=high).contains(&recorded) {
                    return Err(TraceError::PayloadDecode {
                        offset,
                        name: RANDINT.name.to_string(),
                        detail: format!("recorded value {recorded} outside [{low}, {high}]"),
                    });
                }
                Ok(recorded)
            }
        }
    }

    fn distance(&mut self, dy: f64, dx: f64) -> Result<f64, TraceError> {
        // Computed in every mode: replay compares the recorded result with it.
        let live = self.source.distance(dy, dx)?;
        let live_values = [Value::F64(dy), Value::F64(dx), Value::F64(live)];
        match &mut self.mode {
            Mode::Idle => Ok(live),
            Mode::Recording(writer) => {
                writer.write(HYP.name, HYP.format, &live_values)?;
                Ok(live)
            }
            Mode::Replaying(reader) => {
                let values = reader.read_specific(HYP.name, HYP.format)?;
                let offset = reader.last_offset();
                let &[Value::F64(rec_dy), Value::F64(rec_dx), Value::F64(recorded)] =
                    values.as_slice()
                else {
                    return Err(layout_error(offset, &HYP));
                };
                if !(within(rec_dy, dy) && within(rec_dx, dx) && within(recorded, live)) {
                    warn!(offset, dy, dx, "recorded distance differs from live distance");
                    return Err(TraceError::DataMismatch {
                        offset,
                        name: HYP.name.to_string(),
                        expected: live_values.to_vec(),
                        actual: values,
                    });
                }
                Ok(recorded)
            }
        }
    }

    fn shuffle<T>(&mut self, items: &mut [T]) -> Result<(), TraceError> {
        let len = u32::try_from(items.len()).map_err(|_| TraceError::PayloadEncode {
            name: SHUFFLE.name.to_string(),
            detail: format!("sequence of {} items exceeds u32", items.len()),
        })?;
        self.read_and_write(SHUFFLE.name, SHUFFLE.format, &[Value::U32(len)])?;
        fisher_yates(self, items)
    }
}

fn within(recorded: f64, live: f64) -> bool {
    // Written so that NaN on either side fails.
    (recorded - live).abs() < DISTANCE_TOLERANCE
}

fn layout_error(offset: u64, kind: &PacketKind) -> TraceError {
    TraceError::PayloadDecode {
        offset,
        name: kind.name.to_string(),
        detail: "values do not have the expected layout".to_string(),
    }
}

/// What survives of a session while the game state is persisted.
///
/// Holds no generator and no stream. [`resume`](Self::resume) builds an
/// idle session with a generator seeded from entropy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendedSession {
    /// Seed of the trace the session was last attached to.
    pub seed: Option<u32>,
    /// Challenge of the trace the session was last attached to.
    pub challenge: Option<u32>,
}

impl SuspendedSession {
    /// Resume as an idle session with the default configuration.
    pub fn resume(self) -> Session {
        self.resume_with_config(TraceConfig::default())
    }

    /// Resume as an idle session with `config`.
    pub fn resume_with_config(self, config: TraceConfig) -> Session {
        let mut session = Session::with_config(config);
        session.seed = self.seed;
        session.challenge = self.challenge;
        info!(seed = ?self.seed, "session resumed");
        session
    }
}
