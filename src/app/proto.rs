//! `demo.v1.Users` messages and service glue, kept in sync by hand with
//! `proto/demo/v1/users.proto`.

use crate::app::users;

pub const SERVICE: &str = "demo.v1.Users";
const GET_USER: &str = "/demo.v1.Users/GetUser";
const CREATE_USER: &str = "/demo.v1.Users/CreateUser";

#[derive(Clone, PartialEq, prost::Message)]
pub struct GetUserRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct CreateUserRequest {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub email: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct User {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub email: String,
}

impl From<users::User> for User {
    fn from(user: users::User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

pub mod users_server {
    use std::convert::Infallible;
    use std::sync::Arc;
    use std::task::{Context, Poll};

    use async_trait::async_trait;
    use tonic::body::BoxBody;
    use tonic::codec::ProstCodec;
    use tonic::codegen::{http, Body, BoxFuture, Service, StdError};
    use tonic::server::{Grpc, NamedService, UnaryService};
    use tonic::{Request, Response, Status};

    use super::{CreateUserRequest, GetUserRequest, User, CREATE_USER, GET_USER, SERVICE};

    #[async_trait]
    pub trait Users: Send + Sync + 'static {
        async fn get_user(&self, request: Request<GetUserRequest>) -> Result<Response<User>, Status>;

        async fn create_user(&self, request: Request<CreateUserRequest>) -> Result<Response<User>, Status>;
    }

    pub struct UsersServer<T> {
        inner: Arc<T>,
    }

    impl<T> UsersServer<T> {
        pub fn new(inner: T) -> Self {
            Self { inner: Arc::new(inner) }
        }
    }

    impl<T> Clone for UsersServer<T> {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<T> NamedService for UsersServer<T> {
        const NAME: &'static str = SERVICE;
    }

    struct GetUser<T>(Arc<T>);

    impl<T: Users> UnaryService<GetUserRequest> for GetUser<T> {
        type Response = User;
        type Future = BoxFuture<Response<User>, Status>;

        fn call(&mut self, request: Request<GetUserRequest>) -> Self::Future {
            let inner = Arc::clone(&self.0);
            Box::pin(async move { inner.get_user(request).await })
        }
    }

    struct CreateUser<T>(Arc<T>);

    impl<T: Users> UnaryService<CreateUserRequest> for CreateUser<T> {
        type Response = User;
        type Future = BoxFuture<Response<User>, Status>;

        fn call(&mut self, request: Request<CreateUserRequest>) -> Self::Future {
            let inner = Arc::clone(&self.0);
            Box::pin(async move { inner.create_user(request).await })
        }
    }

    impl<T, B> Service<http::Request<B>> for UsersServer<T>
    where
        T: Users,
        B: Body + Send + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<BoxBody>;
        type Error = Infallible;
        type Future = BoxFuture<Self::Response, Self::Error>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = Arc::clone(&self.inner);
            match req.uri().path() {
                GET_USER => Box::pin(async move {
                    let mut grpc = Grpc::new(ProstCodec::default());
                    Ok(grpc.unary(GetUser(inner), req).await)
                }),
                CREATE_USER => Box::pin(async move {
                    let mut grpc = Grpc::new(ProstCodec::default());
                    Ok(grpc.unary(CreateUser(inner), req).await)
                }),
                _ => Box::pin(async move { Ok(unimplemented()) }),
            }
        }
    }

    fn unimplemented() -> http::Response<BoxBody> {
        let mut response = http::Response::new(tonic::body::empty_body());
        let headers = response.headers_mut();
        headers.insert("grpc-status", http::HeaderValue::from(tonic::Code::Unimplemented as i32));
        headers.insert(http::header::CONTENT_TYPE, http::HeaderValue::from_static("application/grpc"));
        response
    }
}

pub mod users_client {
    use tonic::codec::ProstCodec;
    use tonic::codegen::http;
    use tonic::transport::Channel;
    use tonic::{Request, Response, Status};

    use super::{CreateUserRequest, GetUserRequest, User, CREATE_USER, GET_USER};

    #[derive(Clone)]
    pub struct UsersClient {
        inner: tonic::client::Grpc<Channel>,
    }

    impl UsersClient {
        pub fn new(channel: Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        pub async fn get_user(&mut self, request: Request<GetUserRequest>) -> Result<Response<User>, Status> {
            self.unary(request, GET_USER).await
        }

        pub async fn create_user(&mut self, request: Request<CreateUserRequest>) -> Result<Response<User>, Status> {
            self.unary(request, CREATE_USER).await
        }

        async fn unary<Req, Resp>(&mut self, request: Request<Req>, path: &'static str) -> Result<Response<Resp>, Status>
        where
            Req: prost::Message + 'static,
            Resp: prost::Message + Default + 'static,
        {
            self.inner
                .ready()
                .await
                .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;
            let codec = ProstCodec::<Req, Resp>::default();
            self.inner
                .unary(request, http::uri::PathAndQuery::from_static(path), codec)
                .await
        }
    }
}
