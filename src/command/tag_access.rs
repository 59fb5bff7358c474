//! Mixed-type tag read/write over random word access.
//!
//! Every accepted tag is spread over `words()` consecutive word devices
//! starting at its own device, and the whole list travels in one random
//! read or write. A write sends its BIT tags in a second random bit write.
//! Tags that fail validation never reach the wire.

use tracing::warn;

use super::{put_device, Command, CommandContext, RandomBitWriteCommand, Request};
use super::MAX_RANDOM_POINTS;
use super::{RANDOM_READ, RANDOM_WRITE};
use crate::codec::Decoder;
use crate::datatype::{DataType, Value};
use crate::device::{Device, DeviceKind};
use crate::error::{McError, Result};
use crate::series::PlcSeries;
use crate::tag::{Tag, TagError, TagResult};
use crate::utils::get_bit;

/// A tag that passed validation.
#[derive(Debug, Clone)]
struct PlannedTag {
    device: Device,
    data_type: DataType,
    /// Little-endian value bytes (writes only).
    bytes: Vec<u8>,
}

type Plan = Vec<std::result::Result<PlannedTag, TagError>>;

fn plan_tag(tag: &Tag, series: PlcSeries, write: bool) -> Result<PlannedTag> {
    let device = Device::parse(&tag.device, series)?;
    let data_type = tag.data_type;

    if data_type == DataType::Bit && device.code().kind() != DeviceKind::Bit {
        return Err(McError::data_type(format!(
            "BIT tag needs a bit device, \"{}\" is not one",
            device
        )));
    }
    // The last word the value occupies must exist too.
    device.offset(data_type.words() as u32 - 1, series)?;

    let bytes = if write {
        let value = tag
            .value
            .as_ref()
            .ok_or_else(|| McError::data_type("write tag has no value"))?;
        data_type.encode(value)?
    } else {
        Vec::new()
    };

    Ok(PlannedTag {
        device,
        data_type,
        bytes,
    })
}

fn plan_tags(tags: &[Tag], series: PlcSeries, write: bool) -> Plan {
    tags.iter()
        .map(|tag| {
            plan_tag(tag, series, write).map_err(|err| {
                warn!(device = %tag.device, data_type = %tag.data_type, error = %err, "tag rejected");
                TagError::from_error(err)
            })
        })
        .collect()
}

fn accepted(plan: &Plan) -> impl Iterator<Item = &PlannedTag> {
    plan.iter().filter_map(|p| p.as_ref().ok())
}

fn word_tags(plan: &Plan) -> impl Iterator<Item = &PlannedTag> {
    accepted(plan).filter(|p| p.data_type != DataType::Bit)
}

fn total_words<'a>(tags: impl Iterator<Item = &'a PlannedTag>) -> Result<usize> {
    let words: usize = tags.map(|p| p.data_type.words()).sum();
    if words > MAX_RANDOM_POINTS {
        return Err(McError::invalid_parameter(
            "tags",
            format!(
                "accepted tags span {} words, exceeding the maximum of {}",
                words, MAX_RANDOM_POINTS
            ),
        ));
    }
    Ok(words)
}

/// Command for reading a list of typed tags.
#[derive(Debug, Clone)]
pub struct TagReadCommand {
    tags: Vec<Tag>,
    plan: Plan,
}

impl TagReadCommand {
    /// Validates the tags for the given series.
    ///
    /// Invalid tags are kept and reported in the output instead of failing
    /// the command.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{DataType, PlcSeries, Tag, TagReadCommand};
    ///
    /// let cmd = TagReadCommand::new(
    ///     &[Tag::read("D0", DataType::SWord), Tag::read("Q0", DataType::SWord)],
    ///     PlcSeries::Q,
    /// );
    /// assert_eq!(cmd.accepted_count(), 1);
    /// ```
    pub fn new(tags: &[Tag], series: PlcSeries) -> Self {
        Self {
            tags: tags.to_vec(),
            plan: plan_tags(tags, series, false),
        }
    }

    /// Returns how many tags will be sent.
    pub fn accepted_count(&self) -> usize {
        accepted(&self.plan).count()
    }
}

impl Command for TagReadCommand {
    type Output = Vec<TagResult>;

    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let words = total_words(accepted(&self.plan))?;
        let mut enc = ctx.encoder();
        enc.put_u8(words as u8);
        enc.put_u8(0);
        for planned in accepted(&self.plan) {
            for i in 0..planned.data_type.words() {
                put_device(&mut enc, planned.device.offset(i as u32, ctx.series)?, ctx.series)?;
            }
        }
        Ok(Request::new(
            RANDOM_READ,
            ctx.series.word_subcommand(),
            enc.into_bytes(),
        ))
    }

    fn parse_response(&self, data: &[u8], ctx: CommandContext) -> Result<Vec<TagResult>> {
        let mut dec = Decoder::new(ctx.mode, data);
        let mut results = Vec::with_capacity(self.tags.len());

        for (tag, planned) in self.tags.iter().zip(&self.plan) {
            let planned = match planned {
                Ok(planned) => planned,
                Err(err) => {
                    results.push(TagResult::failed(tag, err.clone()));
                    continue;
                }
            };

            let bytes = dec.get_words(planned.data_type.words())?;
            let value = match planned.data_type {
                DataType::Bit => {
                    let word = u16::from_le_bytes([bytes[0], bytes[1]]);
                    Value::Bool(get_bit(word, 0))
                }
                other => other.decode(&bytes, false)?,
            };
            results.push(TagResult::succeeded(tag, value));
        }

        if dec.remaining() != 0 {
            return Err(McError::frame(format!(
                "{} unexpected bytes after tag data",
                dec.remaining()
            )));
        }
        Ok(results)
    }
}

/// Command for writing a list of typed tags.
#[derive(Debug, Clone)]
pub struct TagWriteCommand {
    tags: Vec<Tag>,
    plan: Plan,
}

impl TagWriteCommand {
    /// Validates and encodes the tags for the given series.
    ///
    /// Tags without a value or with a value the type cannot hold are
    /// rejected individually.
    ///
    /// # Example
    ///
    /// ```
    /// use melsec_mc::{DataType, PlcSeries, Tag, TagWriteCommand};
    ///
    /// let cmd = TagWriteCommand::new(
    ///     &[
    ///         Tag::write("D0", DataType::SWord, 10i16),
    ///         Tag::write("M0", DataType::Bit, true),
    ///         Tag::write("D1", DataType::SWord, 70000i32),
    ///     ],
    ///     PlcSeries::Q,
    /// );
    /// assert_eq!(cmd.accepted_count(), 2);
    /// assert_eq!(cmd.word_tag_count(), 1);
    /// assert!(cmd.bit_command().unwrap().is_some());
    /// ```
    pub fn new(tags: &[Tag], series: PlcSeries) -> Self {
        Self {
            tags: tags.to_vec(),
            plan: plan_tags(tags, series, true),
        }
    }

    /// Returns how many tags will be sent.
    pub fn accepted_count(&self) -> usize {
        accepted(&self.plan).count()
    }

    /// Returns how many accepted tags go out in the random word write.
    pub fn word_tag_count(&self) -> usize {
        word_tags(&self.plan).count()
    }

    /// Builds the random bit write carrying the accepted BIT tags.
    ///
    /// Returns `None` when there are none.
    ///
    /// # Errors
    ///
    /// Returns `McError::InvalidParameter` if there are more BIT tags than
    /// one random bit write can carry.
    pub fn bit_command(&self) -> Result<Option<RandomBitWriteCommand>> {
        let (devices, values): (Vec<Device>, Vec<bool>) = accepted(&self.plan)
            .filter(|p| p.data_type == DataType::Bit)
            .map(|p| (p.device, p.bytes.first().is_some_and(|&b| b != 0)))
            .unzip();
        if devices.is_empty() {
            return Ok(None);
        }
        RandomBitWriteCommand::new(devices, &values).map(Some)
    }
}

impl Command for TagWriteCommand {
    type Output = Vec<TagResult>;

    /// Encodes the random word write. BIT tags are left to
    /// [`TagWriteCommand::bit_command`].
    fn request(&self, ctx: CommandContext) -> Result<Request> {
        let words = total_words(word_tags(&self.plan))?;
        let mut enc = ctx.encoder();
        enc.put_u8(words as u8);
        enc.put_u8(0);
        for planned in word_tags(&self.plan) {
            for (i, word) in planned.bytes.chunks(2).enumerate() {
                put_device(&mut enc, planned.device.offset(i as u32, ctx.series)?, ctx.series)?;
                enc.put_le(word);
            }
        }
        Ok(Request::new(
            RANDOM_WRITE,
            ctx.series.word_subcommand(),
            enc.into_bytes(),
        ))
    }

    fn parse_response(&self, _data: &[u8], _ctx: CommandContext) -> Result<Vec<TagResult>> {
        Ok(self
            .tags
            .iter()
            .zip(&self.plan)
            .map(|(tag, planned)| match planned {
                Ok(_) => match tag.value {
                    Some(value) => TagResult::succeeded(tag, value),
                    None => TagResult::failed(tag, TagError::DataType("write tag has no value".into())),
                },
                Err(err) => TagResult::failed(tag, err.clone()),
            })
            .collect())
    }
}
