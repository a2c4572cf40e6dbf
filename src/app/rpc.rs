//! gRPC services of the demo service.
//!
//! Handler failures are rendered with the caller's `x-request-id`, so the
//! RequestInfo detail of a status matches what the client sent.

use std::sync::Arc;

use async_trait::async_trait;
use tonic::service::Routes;
use tonic::{Request, Response, Status};

use crate::app::proto::users_server::{Users, UsersServer};
use crate::app::proto::{CreateUserRequest, GetUserRequest, User};
use crate::app::users::{NewUser, UserDirectory};
use crate::errors::{rpc, Error};

pub struct UsersService {
    users: Arc<UserDirectory>,
}

impl UsersService {
    pub fn new(users: Arc<UserDirectory>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl Users for UsersService {
    async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<User>, Status> {
        let request_id = rpc::request_id(&request);
        let GetUserRequest { id } = request.into_inner();

        self.users
            .get(&id)
            .map(|user| Response::new(user.into()))
            .map_err(|e| Error::wrap("rpc.get_user", e).to_status(&request_id))
    }

    async fn create_user(&self, request: Request<CreateUserRequest>) -> Result<Response<User>, Status> {
        let request_id = rpc::request_id(&request);
        let CreateUserRequest { name, email } = request.into_inner();

        self.users
            .create(NewUser { name, email })
            .map(|user| Response::new(user.into()))
            .map_err(|e| Error::wrap("rpc.create_user", e).to_status(&request_id))
    }
}

/// Routes for the RPC endpoint: the user directory plus the standard health
/// service, reporting the whole server as serving.
pub fn routes(users: Arc<UserDirectory>) -> Routes {
    let (_reporter, health) = tonic_health::server::health_reporter();
    Routes::new(health).add_service(UsersServer::new(UsersService::new(users)))
}
