pub mod marker_dto;

pub use marker_dto::{CreateReportDto, MarkerResponseDto, UpdateReportDto};
