//! Chapter membership value objects: a member's position and the branch
//! they belong to. Stored as SMALLINT, exchanged as snake_case strings.

use derive_more::Display;
use serde::{Deserialize, Serialize};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Position {
    #[display("student")]
    Student = 0,
    #[display("alumni")]
    Alumni = 1,
    #[display("mentor")]
    Mentor = 2,
    #[display("leader")]
    Leader = 3,
    #[display("advisor")]
    Advisor = 4,
    #[display("sponsor")]
    Sponsor = 5,
}

impl Position {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub const fn from_id(id: i16) -> Option<Self> {
        use Position::*;
        match id {
            0 => Some(Student),
            1 => Some(Alumni),
            2 => Some(Mentor),
            3 => Some(Leader),
            4 => Some(Advisor),
            5 => Some(Sponsor),
            _ => None,
        }
    }
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
pub enum Branch {
    #[display("projects")]
    Projects = 1,
    #[display("interview")]
    Interview = 2,
    #[display("marketing")]
    Marketing = 3,
}

impl Branch {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub const fn from_id(id: i16) -> Option<Self> {
        match id {
            1 => Some(Branch::Projects),
            2 => Some(Branch::Interview),
            3 => Some(Branch::Marketing),
            _ => None,
        }
    }
}
