pub mod compiler_service {
    tonic::include_proto!("compiler_service");
}
