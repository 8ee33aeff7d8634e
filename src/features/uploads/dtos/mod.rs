mod upload_dto;

pub use upload_dto::{
    is_mime_type_allowed, AcceptedFileDto, DeleteDocumentResponseDto, RejectedFileDto,
    UploadRequestDto, UploadResultDto, MAX_FILES_PER_UPLOAD, MAX_FILE_SIZE,
};
