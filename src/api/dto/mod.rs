//! Request/response DTOs for the REST API.

pub mod ledger_dto;
pub mod tracking_dto;

pub use ledger_dto::{
    CreateShipmentRequest, EntriesQuery, EntriesResponse, ExpensesResponse, LedgerEntryDto,
    PostExpenseRequest, ShipmentResponse,
};
pub use tracking_dto::{
    ActiveContainerDto, ActiveContainersResponse, ContainerResponse, CreateContainerRequest,
    IngestResponse, ManualEventRequest, TimelineResponse, TimelineStageDto, UpdateStatusRequest,
    WebhookEventDto, WebhookRequest,
};
