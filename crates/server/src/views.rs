//! Engine values rendered as API bodies.

use api_types::{
    dashboard::{MonthRevenue, OwnerDashboard as OwnerDashboardBody, Stats, StatusCount},
    expense::ExpenseView,
    order::{DocumentsView, OrderView, StopBody},
    timeline::TimelineEventView,
    transfer::TransferView,
    truck::TruckView,
    user::UserView,
};
use engine::{
    DashboardStats, Expense, MoneyTransfer, Order, OwnerDashboard, Stop, TimelineEvent, Truck,
    User,
};

pub(crate) fn truck(truck: Truck) -> TruckView {
    TruckView {
        id: truck.id,
        number: truck.number,
        make: truck.make,
        model: truck.model,
        year: truck.year,
        axle_count: truck.axle_count,
        capacity_kg: truck.capacity_kg,
        fuel_type: truck.fuel_type,
        current_mileage_km: truck.current_mileage_km,
        rc_expiry: truck.registration.expires_on,
        rc_document: truck.registration.document,
        insurance_expiry: truck.insurance.expires_on,
        insurance_document: truck.insurance.document,
        pollution_expiry: truck.pollution.expires_on,
        pollution_document: truck.pollution.document,
        status: truck.status.as_str().to_string(),
        status_display: truck.status.label().to_string(),
        owner_id: truck.owner_id,
        assigned_driver_id: truck.assigned_driver_id,
        created_at: truck.created_at,
        updated_at: truck.updated_at,
    }
}

fn stop(stop: Stop) -> StopBody {
    StopBody {
        location: stop.location,
        contact: stop.contact,
        phone: stop.phone,
    }
}

pub(crate) fn stop_from_body(body: StopBody) -> Stop {
    Stop::new(body.location, body.contact, body.phone)
}

pub(crate) fn order(order: Order) -> OrderView {
    OrderView {
        id: order.id,
        order_number: order.code,
        description: order.description,
        pickup: stop(order.pickup),
        delivery: stop(order.delivery),
        pickup_date: order.pickup_date,
        estimated_delivery_date: order.estimated_delivery_date,
        actual_delivery_date: order.actual_delivery_date,
        load_type: order.load_type,
        weight_kg: order.weight_kg,
        volume_litres: order.volume_litres,
        total_amount_minor: order.total_amount_minor,
        advance_amount_minor: order.advance_amount_minor,
        balance_amount_minor: order.balance_amount_minor,
        status: order.status.as_str().to_string(),
        status_display: order.status.label().to_string(),
        truck_id: order.truck_id,
        driver_id: order.driver_id,
        owner_id: order.owner_id,
        created_by: order.created_by,
        documents: DocumentsView {
            waybill: order.documents.waybill,
            lr_copy: order.documents.lr_copy,
            other: order.documents.other,
        },
        created_at: order.created_at,
        updated_at: order.updated_at,
    }
}

pub(crate) fn expense(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        order_id: expense.order_id,
        category: expense.category.as_str().to_string(),
        category_display: expense.category.label().to_string(),
        description: expense.description,
        amount_minor: expense.amount_minor,
        bill_photo: expense.bill_photo,
        added_by: expense.added_by,
        created_at: expense.created_at,
    }
}

pub(crate) fn transfer(transfer: MoneyTransfer) -> TransferView {
    TransferView {
        id: transfer.id,
        order_id: transfer.order_id,
        transfer_type: transfer.kind.as_str().to_string(),
        transfer_type_display: transfer.kind.label().to_string(),
        amount_minor: transfer.amount_minor,
        description: transfer.description,
        status: transfer.status.as_str().to_string(),
        status_display: transfer.status.label().to_string(),
        transaction_ref: transfer.bank.transaction_ref,
        bank_name: transfer.bank.bank_name,
        account_number: transfer.bank.account_number,
        ifsc_code: transfer.bank.ifsc_code,
        receipt: transfer.receipt,
        created_by: transfer.created_by,
        created_at: transfer.created_at,
        updated_at: transfer.updated_at,
    }
}

pub(crate) fn event(event: TimelineEvent) -> TimelineEventView {
    TimelineEventView {
        id: event.id,
        order_id: event.order_id,
        event_type: event.kind.as_str().to_string(),
        event_type_display: event.kind.label().to_string(),
        title: event.title,
        description: event.description,
        related_expense_id: event.related_expense_id,
        related_transfer_id: event.related_transfer_id,
        created_by: event.created_by,
        created_at: event.created_at,
    }
}

pub(crate) fn user(user: User) -> UserView {
    UserView {
        id: user.id,
        full_name: user.full_name(),
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        phone: user.phone,
        role: user.role.as_str().to_string(),
        role_display: user.role.label().to_string(),
        is_active: user.is_active,
        created_at: user.created_at,
    }
}

pub(crate) fn stats(stats: DashboardStats) -> Stats {
    Stats {
        total_orders: stats.total_orders,
        active_orders: stats.active_orders,
        total_revenue_minor: stats.total_revenue_minor,
        pending_amount_minor: stats.pending_amount_minor,
        total_expenses_minor: stats.total_expenses_minor,
        total_profit_minor: stats.total_profit_minor,
        recent_orders: stats.recent_orders.into_iter().map(order).collect(),
        upcoming_deliveries: stats.upcoming_deliveries.into_iter().map(order).collect(),
        recent_expenses: stats.recent_expenses.into_iter().map(expense).collect(),
    }
}

pub(crate) fn owner_dashboard(dashboard: OwnerDashboard) -> OwnerDashboardBody {
    OwnerDashboardBody {
        owner: user(dashboard.owner),
        truck_count: dashboard.truck_count,
        active_trucks: dashboard.active_trucks,
        total_orders: dashboard.total_orders,
        total_revenue_minor: dashboard.total_revenue_minor,
        orders_by_status: dashboard
            .orders_by_status
            .into_iter()
            .map(|(status, count)| StatusCount {
                status: status.as_str().to_string(),
                status_display: status.label().to_string(),
                count,
            })
            .collect(),
        revenue_by_month: dashboard
            .revenue_by_month
            .into_iter()
            .map(|m| MonthRevenue {
                month: format!("{:04}-{:02}", m.year, m.month),
                total_minor: m.total_minor,
            })
            .collect(),
    }
}

/// Parses an optional vocabulary value sent by a client.
pub(crate) fn choice<T>(value: Option<&str>) -> Result<Option<T>, engine::EngineError>
where
    T: for<'a> TryFrom<&'a str, Error = engine::EngineError>,
{
    value.map(|v| T::try_from(v.trim())).transpose()
}
