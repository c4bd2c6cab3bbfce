pub mod session_dto;

pub use session_dto::{
    EditMarkerDto, MoveMarkerDto, PlaceMarkerDto, SessionBoardDto, SessionCreatedDto,
    SessionMarkerDto,
};
