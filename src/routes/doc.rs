use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginResponse, PublicUser},
        bookings::{AdminBooking, AdminBookingList, BookingWithRoom, PaymentDetails, UserBookingList},
        notifications::NotificationFeed,
        payments::SavePaymentResponse,
        rooms::{RoomList, RoomWithBookings, RoomWithBookingsList},
    },
    models::{Booking, Notification, Payment, Room, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, notifications, payments, rooms, users},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::forgot_password,
        auth::verify_code,
        auth::reset_password,
        rooms::list_rooms,
        rooms::get_room,
        users::profile,
        users::my_bookings,
        payments::save_payment,
        notifications::admin_feed,
        notifications::user_feed,
        notifications::mark_read,
        notifications::mark_all_read,
        notifications::delete_notification,
        admin::login,
        admin::dashboard,
        admin::list_users,
        admin::get_user,
        admin::delete_user,
        admin::make_admin,
        admin::remove_admin,
        admin::update_role,
        admin::list_rooms,
        admin::create_room,
        admin::update_room,
        admin::delete_room,
        admin::list_bookings,
        admin::update_booking_status,
        admin::delete_booking
    ),
    components(
        schemas(
            User,
            Room,
            Booking,
            Payment,
            Notification,
            PublicUser,
            LoginResponse,
            BookingWithRoom,
            AdminBooking,
            AdminBookingList,
            UserBookingList,
            PaymentDetails,
            RoomList,
            RoomWithBookings,
            RoomWithBookingsList,
            NotificationFeed,
            SavePaymentResponse,
            admin::DashboardStats,
            admin::UpdateRoleRequest,
            admin::UserList,
            Meta,
            ApiResponse<Room>,
            ApiResponse<RoomList>,
            ApiResponse<BookingWithRoom>,
            ApiResponse<AdminBookingList>,
            ApiResponse<NotificationFeed>,
            ApiResponse<SavePaymentResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "User authentication and password reset"),
        (name = "Rooms", description = "Public room catalogue"),
        (name = "Users", description = "Authenticated user profile and bookings"),
        (name = "Payments", description = "Payment intake"),
        (name = "Notifications", description = "Notification feeds and realtime stream"),
        (name = "Admin", description = "Admin operations"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
