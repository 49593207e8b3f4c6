use {
    super::{KeyFrameId, NodeId},
    glam::{Mat4, Quat, Vec3},
    serde::{Deserialize, Serialize},
};

/// The shared pool of keyframes read from a file, plus the timing shared by all of them.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AnimationData {
    pub(crate) duration: f32,
    pub(crate) key_frames: Vec<KeyFrameData>,
    pub(crate) name: String,
    pub(crate) num_frames: u32,
}

impl AnimationData {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Length of the animation, in seconds. This is the longest of all keyframe channels.
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn key_frame(&self, id: KeyFrameId) -> Option<&KeyFrameData> {
        self.key_frames.get(id.0)
    }

    pub fn key_frames(&self) -> &[KeyFrameData] {
        &self.key_frames
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_frames(&self) -> u32 {
        self.num_frames
    }

    pub(crate) fn push_key_frame(&mut self, key_frame: KeyFrameData) -> KeyFrameId {
        self.duration = self.duration.max(key_frame.duration());
        self.num_frames = self.num_frames.max(key_frame.times.len() as _);
        self.key_frames.push(key_frame);

        KeyFrameId(self.key_frames.len() - 1)
    }
}

/// Binds an [`AnimationData`] to the nodes it moves.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AnimationInstance {
    pub(crate) animation: usize,
    pub(crate) channels: Vec<KeyframeChannel>,
}

impl AnimationInstance {
    /// Index into [`Model::animations`](crate::Model::animations).
    pub fn animation(&self) -> usize {
        self.animation
    }

    pub fn channels(&self) -> &[KeyframeChannel] {
        &self.channels
    }

    /// Returns the channels which animate the given node.
    pub fn channels_for(&self, node: NodeId) -> impl Iterator<Item = &KeyframeChannel> {
        self.channels
            .iter()
            .filter(move |channel| channel.nodes.contains(&node))
    }
}

/// Values for one transform channel of one node, one entry per frame.
///
/// Only one of the value vectors is populated for keyframes read from a file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct KeyFrameData {
    pub(crate) interpolation: Interpolation,
    pub(crate) matrix: Vec<Mat4>,
    pub(crate) rotation: Vec<Quat>,
    pub(crate) scale: Vec<Vec3>,
    pub(crate) times: Vec<f32>,
    pub(crate) translation: Vec<Vec3>,
}

impl KeyFrameData {
    /// Builds timestamps for `num_frames` evenly spaced frames at the given rate.
    pub(crate) fn frame_times(num_frames: usize, fps: f32) -> Vec<f32> {
        let duration = num_frames as f32 / fps;
        let frame_duration = duration / num_frames as f32;

        (0..num_frames)
            .map(|frame| frame as f32 * frame_duration)
            .collect()
    }

    /// The time between the first frame and the end of the last frame, in seconds.
    pub fn duration(&self) -> f32 {
        match self.times.as_slice() {
            [] => 0.0,
            [_] => self.times[0],
            times => {
                let last = times[times.len() - 1];
                last + (last - times[times.len() - 2])
            }
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn matrix(&self) -> &[Mat4] {
        &self.matrix
    }

    pub fn rotation(&self) -> &[Quat] {
        &self.rotation
    }

    pub fn scale(&self) -> &[Vec3] {
        &self.scale
    }

    /// Frame timestamps, in seconds.
    pub fn times(&self) -> &[f32] {
        &self.times
    }

    pub fn translation(&self) -> &[Vec3] {
        &self.translation
    }

    pub fn sample_matrix(&self, time: f32) -> Option<Mat4> {
        sample(
            &self.times,
            &self.matrix,
            self.interpolation,
            time,
            |a, b, s| a * (1.0 - s) + b * s,
        )
    }

    pub fn sample_rotation(&self, time: f32) -> Option<Quat> {
        sample(
            &self.times,
            &self.rotation,
            self.interpolation,
            time,
            |a, b, s| a.slerp(b, s),
        )
        .map(Quat::normalize)
    }

    pub fn sample_scale(&self, time: f32) -> Option<Vec3> {
        sample(&self.times, &self.scale, self.interpolation, time, Vec3::lerp)
    }

    pub fn sample_translation(&self, time: f32) -> Option<Vec3> {
        sample(
            &self.times,
            &self.translation,
            self.interpolation,
            time,
            Vec3::lerp,
        )
    }
}

/// Samples a keyframed value; time is clamped to the first and last frames.
///
/// A NaN time, or times which are not increasing, sample the first frame.
fn sample<T>(
    times: &[f32],
    values: &[T],
    interpolation: Interpolation,
    time: f32,
    lerp: impl Fn(T, T, f32) -> T,
) -> Option<T>
where
    T: Copy,
{
    let (first, last) = match times {
        [first, .., last] if !time.is_nan() => (*first, *last),
        _ => return values.first().copied(),
    };

    if time <= first {
        return values.first().copied();
    } else if time >= last {
        return values.get(times.len() - 1).copied();
    }

    // times[idx] <= time < times[idx + 1]
    let Some(idx) = times.partition_point(|&t| t <= time).checked_sub(1) else {
        return values.first().copied();
    };
    let idx = idx.min(times.len() - 2);
    let s = (time - times[idx]) / (times[idx + 1] - times[idx]);

    match interpolation {
        Interpolation::Linear => Some(lerp(*values.get(idx)?, *values.get(idx + 1)?, s)),
    }
}

/// Binds a set of nodes to one entry of [`AnimationData::key_frames`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct KeyframeChannel {
    pub(crate) key_frame: KeyFrameId,
    pub(crate) nodes: Vec<NodeId>,
}

impl KeyframeChannel {
    pub fn key_frame(&self) -> KeyFrameId {
        self.key_frame
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

/// How values are blended between two keyframes.
///
/// POD files only store linearly interpolated keyframes; rotations are blended with slerp.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
pub enum Interpolation {
    #[default]
    Linear = 1,
}
