//! Landmark vocabulary: face regions and hand joints.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A named anatomical region within a face observation.
///
/// `AllPoints` is a meta-region: it already enumerates the union of every
/// named region, so requesting it alongside others collapses the request to
/// just `AllPoints` during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FaceRegion {
    AllPoints,
    FaceContour,
    LeftEye,
    LeftEyebrow,
    LeftPupil,
    RightEye,
    RightEyebrow,
    RightPupil,
    Nose,
    NoseCrest,
    MedianLine,
    OuterLips,
    InnerLips,
}

impl FaceRegion {
    /// Every region except the `AllPoints` meta-region.
    pub const NAMED: [FaceRegion; 12] = [
        FaceRegion::FaceContour,
        FaceRegion::LeftEye,
        FaceRegion::LeftEyebrow,
        FaceRegion::LeftPupil,
        FaceRegion::RightEye,
        FaceRegion::RightEyebrow,
        FaceRegion::RightPupil,
        FaceRegion::Nose,
        FaceRegion::NoseCrest,
        FaceRegion::MedianLine,
        FaceRegion::OuterLips,
        FaceRegion::InnerLips,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaceRegion::AllPoints => "allPoints",
            FaceRegion::FaceContour => "faceContour",
            FaceRegion::LeftEye => "leftEye",
            FaceRegion::LeftEyebrow => "leftEyebrow",
            FaceRegion::LeftPupil => "leftPupil",
            FaceRegion::RightEye => "rightEye",
            FaceRegion::RightEyebrow => "rightEyebrow",
            FaceRegion::RightPupil => "rightPupil",
            FaceRegion::Nose => "nose",
            FaceRegion::NoseCrest => "noseCrest",
            FaceRegion::MedianLine => "medianLine",
            FaceRegion::OuterLips => "outerLips",
            FaceRegion::InnerLips => "innerLips",
        }
    }
}

impl fmt::Display for FaceRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaceRegion {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allPoints" => Ok(FaceRegion::AllPoints),
            "faceContour" => Ok(FaceRegion::FaceContour),
            "leftEye" => Ok(FaceRegion::LeftEye),
            "leftEyebrow" => Ok(FaceRegion::LeftEyebrow),
            "leftPupil" => Ok(FaceRegion::LeftPupil),
            "rightEye" => Ok(FaceRegion::RightEye),
            "rightEyebrow" => Ok(FaceRegion::RightEyebrow),
            "rightPupil" => Ok(FaceRegion::RightPupil),
            "nose" => Ok(FaceRegion::Nose),
            "noseCrest" => Ok(FaceRegion::NoseCrest),
            "medianLine" => Ok(FaceRegion::MedianLine),
            "outerLips" => Ok(FaceRegion::OuterLips),
            "innerLips" => Ok(FaceRegion::InnerLips),
            _ => Err(ParseRegionError(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown landmark region: {0:?}")]
pub struct ParseRegionError(String);

/// A named joint within a hand observation, wrist plus four joints per digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    LittleMcp,
    LittlePip,
    LittleDip,
    LittleTip,
}

impl HandJoint {
    pub const ALL: [HandJoint; 21] = [
        HandJoint::Wrist,
        HandJoint::ThumbCmc,
        HandJoint::ThumbMp,
        HandJoint::ThumbIp,
        HandJoint::ThumbTip,
        HandJoint::IndexMcp,
        HandJoint::IndexPip,
        HandJoint::IndexDip,
        HandJoint::IndexTip,
        HandJoint::MiddleMcp,
        HandJoint::MiddlePip,
        HandJoint::MiddleDip,
        HandJoint::MiddleTip,
        HandJoint::RingMcp,
        HandJoint::RingPip,
        HandJoint::RingDip,
        HandJoint::RingTip,
        HandJoint::LittleMcp,
        HandJoint::LittlePip,
        HandJoint::LittleDip,
        HandJoint::LittleTip,
    ];
}
